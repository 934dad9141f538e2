//! Behavioural properties of the order book.
//!
//! Randomized sequences run against a naive reference model: a `Vec` kept
//! sorted best-first, with the same add / cancel-at-rank / execute rules.
//! Every run is seeded so a failure reproduces exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rank_book::{BookState, OrderBook, Side};

// ============================================================================
// Reference model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ModelOrder {
    price: u64,
    quantity: u64,
    sequence: u64,
}

struct Model {
    side: Side,
    orders: Vec<ModelOrder>,
    next_sequence: u64,
}

impl Model {
    fn new(side: Side) -> Self {
        Self {
            side,
            orders: Vec::new(),
            next_sequence: 0,
        }
    }

    fn add(&mut self, price: u64, quantity: u64) {
        let order = ModelOrder {
            price,
            quantity,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.orders.push(order);
        let side = self.side;
        self.orders.sort_by(|a, b| {
            let by_price = match side {
                Side::Ask => a.price.cmp(&b.price),
                Side::Bid => b.price.cmp(&a.price),
            };
            by_price.then(a.sequence.cmp(&b.sequence))
        });
    }

    fn cancel(&mut self, rank: usize) {
        if rank < self.orders.len() {
            self.orders.remove(rank);
        }
    }

    fn execute(&mut self, mut quantity: u64) -> u128 {
        let mut cost = 0u128;
        while quantity > 0 && !self.orders.is_empty() {
            let best = &mut self.orders[0];
            let taken = quantity.min(best.quantity);
            cost += u128::from(taken) * u128::from(best.price);
            best.quantity -= taken;
            quantity -= taken;
            if best.quantity == 0 {
                self.orders.remove(0);
            }
        }
        cost
    }
}

fn snapshot(book: &OrderBook) -> Vec<ModelOrder> {
    book.orders()
        .map(|o| ModelOrder {
            price: o.price,
            quantity: o.quantity,
            sequence: o.sequence,
        })
        .collect()
}

fn run_against_model(side: Side, seed: u64, steps: usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut book = OrderBook::with_side(side, seed ^ 0x5EED);
    let mut model = Model::new(side);

    for step in 0..steps {
        match rng.gen_range(0..10) {
            0..=4 => {
                let price = rng.gen_range(90..110);
                let quantity = rng.gen_range(1..20);
                book.add_order(price, quantity).unwrap();
                model.add(price, quantity);
            }
            5..=7 => {
                let rank = rng.gen_range(0..model.orders.len() + 3);
                book.cancel_at_rank(rank);
                model.cancel(rank);
            }
            _ => {
                let quantity = rng.gen_range(1..40);
                let expected = model.execute(quantity);
                assert_eq!(book.execute_market(quantity).cost, expected, "step {step}");
            }
        }

        assert_eq!(book.len(), model.orders.len(), "step {step}");
    }

    assert_eq!(snapshot(&book), model.orders);
    assert!(book.validate().is_ok());
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn matches_reference_model_ask_side() {
    for seed in 0..8 {
        run_against_model(Side::Ask, seed, 2_000);
    }
}

#[test]
fn matches_reference_model_bid_side() {
    for seed in 100..104 {
        run_against_model(Side::Bid, seed, 2_000);
    }
}

#[test]
fn ranks_are_ordered_by_price_then_sequence() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut book = OrderBook::with_seed(7);
    for _ in 0..1_000 {
        book.add_order(rng.gen_range(1..50), rng.gen_range(1..5)).unwrap();
    }

    for rank in 0..book.len() - 1 {
        let a = book.get_by_rank(rank).unwrap();
        let b = book.get_by_rank(rank + 1).unwrap();
        assert!(a.price <= b.price);
        if a.price == b.price {
            assert!(a.sequence < b.sequence);
        }
    }
}

#[test]
fn size_tracks_adds_minus_removals() {
    let mut book = OrderBook::with_seed(3);
    let mut added = 0usize;
    let mut removed = 0usize;

    for i in 0..300u64 {
        book.add_order(10 + i % 7, 2).unwrap();
        added += 1;
        if i % 5 == 0 && book.cancel_at_rank(i as usize % 4).is_some() {
            removed += 1;
        }
        if i % 9 == 0 {
            removed += book.execute_market(5).orders_consumed;
        }
        assert_eq!(book.len(), added - removed);
    }
}

#[test]
fn cancel_out_of_range_leaves_book_unchanged() {
    let mut book = OrderBook::with_seed(5);
    for price in [12, 9, 15, 9] {
        book.add_order(price, 1).unwrap();
    }
    let before = snapshot(&book);
    let root = book.state_root().unwrap();

    assert!(book.cancel_at_rank(4).is_none());
    assert!(book.cancel_at_rank(usize::MAX).is_none());

    assert_eq!(snapshot(&book), before);
    assert_eq!(book.state_root().unwrap(), root);
}

#[test]
fn fifo_at_equal_price() {
    let mut book = OrderBook::new();
    book.add_order(10, 5).unwrap();
    book.add_order(10, 3).unwrap();

    assert_eq!(book.execute_market(6).cost, 60);

    let best = book.get_by_rank(0).unwrap();
    assert_eq!((best.price, best.quantity), (10, 2));
    assert_eq!(book.len(), 1);
}

#[test]
fn partial_fill_under_liquidity() {
    let mut book = OrderBook::new();
    book.add_order(7, 4).unwrap();

    assert_eq!(book.execute_market(10).cost, 28);
    assert_eq!(book.state(), BookState::Empty);
    assert_eq!(book.execute_market(1).cost, 0);
}

#[test]
fn cancel_best_exposes_next_order() {
    let mut book = OrderBook::new();
    book.add_order(20, 1).unwrap(); // A
    book.add_order(15, 1).unwrap(); // B, ranks ahead of A

    book.cancel_at_rank(0);

    let best = book.get_by_rank(0).unwrap();
    assert_eq!((best.price, best.sequence), (20, 0));
}

#[test]
fn execute_cost_equals_greedy_walk() {
    let mut rng = ChaCha8Rng::seed_from_u64(21);

    for _ in 0..50 {
        let mut book = OrderBook::with_seed(rng.gen());
        for _ in 0..rng.gen_range(1..60) {
            book.add_order(rng.gen_range(1..1_000), rng.gen_range(1..100)).unwrap();
        }

        let available = book.total_quantity() as u64;
        let request = rng.gen_range(1..=available);

        // Walk rank order by hand before executing
        let mut left = request;
        let mut expected = 0u128;
        for order in book.orders() {
            let taken = left.min(order.quantity);
            expected += u128::from(taken) * u128::from(order.price);
            left -= taken;
            if left == 0 {
                break;
            }
        }

        let report = book.execute_market(request);
        assert_eq!(report.cost, expected);
        assert_eq!(report.filled, request);
        assert!(!report.is_partial());
    }
}

#[test]
fn seed_changes_shape_not_contents() {
    let mut a = OrderBook::with_seed(1);
    let mut b = OrderBook::with_seed(2);
    let mut rng = ChaCha8Rng::seed_from_u64(77);

    for _ in 0..500 {
        let price = rng.gen_range(1..30);
        let quantity = rng.gen_range(1..10);
        a.add_order(price, quantity).unwrap();
        b.add_order(price, quantity).unwrap();
    }
    a.cancel_at_rank(17);
    b.cancel_at_rank(17);

    assert_eq!(a.execute_market(333).cost, b.execute_market(333).cost);
    assert_eq!(a.state_root().unwrap(), b.state_root().unwrap());
}
