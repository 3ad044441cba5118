use crate::domain::stock::StockCounter;
use crate::domain::value_objects::BookId;
use crate::ports::stock_client::{
    CommunicationFailure, ReleaseOutcome, ReserveOutcome, StockClient,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory stock ledger.
///
/// Owns one counter per registered book and serializes every mutation
/// behind a single mutex, so concurrent reserve/release calls on the same
/// book never produce a lost update. This is the local stand-in for the
/// remote stock service and the reference implementation of its contract.
pub struct InMemoryStockLedger {
    counters: Mutex<HashMap<BookId, StockCounter>>,
}

impl InMemoryStockLedger {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Register a book with the given total quantity, fully available.
    pub fn register_book(&self, book_id: BookId, quantity: u32) {
        self.counters
            .lock()
            .unwrap()
            .insert(book_id, StockCounter::new(quantity));
    }

    /// Current number of available copies, if the book is registered.
    pub fn available(&self, book_id: BookId) -> Option<u32> {
        self.counters
            .lock()
            .unwrap()
            .get(&book_id)
            .map(|counter| counter.available())
    }
}

impl Default for InMemoryStockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StockClient for InMemoryStockLedger {
    async fn try_reserve(&self, book_id: BookId) -> Result<ReserveOutcome, CommunicationFailure> {
        let mut counters = self.counters.lock().unwrap();
        let Some(counter) = counters.get_mut(&book_id) else {
            return Ok(ReserveOutcome::NotFound);
        };

        match counter.reserve() {
            Ok(next) => {
                *counter = next;
                Ok(ReserveOutcome::Reserved)
            }
            Err(_) => Ok(ReserveOutcome::OutOfStock),
        }
    }

    async fn try_release(&self, book_id: BookId) -> Result<ReleaseOutcome, CommunicationFailure> {
        let mut counters = self.counters.lock().unwrap();
        let Some(counter) = counters.get_mut(&book_id) else {
            return Ok(ReleaseOutcome::NotFound);
        };

        match counter.release() {
            Ok(next) => {
                *counter = next;
                Ok(ReleaseOutcome::Released)
            }
            Err(_) => Ok(ReleaseOutcome::AtFullQuantity),
        }
    }
}
