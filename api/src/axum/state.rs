use buddy::FlightSearch;
use std::sync::Arc;

pub struct State {
    pub flights: Arc<dyn FlightSearch>,
}

#[allow(clippy::module_name_repetitions)]
pub type AppState = Arc<State>;

pub fn create(flights: Arc<dyn FlightSearch>) -> AppState {
    Arc::new(State { flights })
}
