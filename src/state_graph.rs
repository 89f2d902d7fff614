//! # State Graph Module
//!
//! The finite-state machine of the conversation. It is built once from the
//! root menu and is read-only afterwards, so one instance is shared by every
//! chat through an `Arc`.

use tracing::{debug, info};

use crate::dialogue::SessionState;
use crate::location::{
    Handler, HandlerChain, InputFilter, Location, LocationId, Locations, Response, StateTable,
    Transition,
};

/// Transition table of the conversation together with its locations
pub struct StateGraph {
    locations: Locations,
    states: StateTable,
    root: LocationId,
    /// Root buttons usable before the conversation started, without the fallback
    entry: HandlerChain,
}

impl StateGraph {
    /// Walk the tree from `root` and record every reachable location
    pub fn build(locations: Locations, root: LocationId) -> Self {
        info!("States creating...");
        let mut states = StateTable::new();
        locations.register_into(root, &mut states);

        let entry = entry_chain(&locations, &states, root);
        let graph = Self {
            locations,
            states,
            root,
            entry,
        };
        info!(count = graph.len(), "Number of states");
        info!(states = ?graph.state_names(), "Created states");
        graph
    }

    pub fn root(&self) -> LocationId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.states.contains_key(&id)
    }

    pub fn states(&self) -> &StateTable {
        &self.states
    }

    pub fn locations(&self) -> &Locations {
        &self.locations
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id)
    }

    pub fn state_names(&self) -> Vec<String> {
        self.states
            .keys()
            .filter_map(|id| self.locations.get(*id))
            .map(ToString::to_string)
            .collect()
    }

    /// `/start`: greet with the root and move there
    pub fn start(&self) -> Response {
        Response {
            replies: self.locations.send_welcome(self.root),
            transition: Transition::To(self.root),
        }
    }

    /// Entry points for a chat outside the conversation: the root's own
    /// buttons first, then any message greets with the root
    pub fn enter(&self, input: Option<&str>, session: &mut SessionState) -> Response {
        let response = self
            .locations
            .handle_with(&self.entry, self.root, input, session);
        if response.is_handled() {
            return response;
        }
        self.start()
    }

    /// Feed an inbound message to the handler chain of `state`
    pub fn dispatch(
        &self,
        state: LocationId,
        input: Option<&str>,
        session: &mut SessionState,
    ) -> Response {
        let Some(chain) = self.states.get(&state) else {
            debug!(location = %state, "Message for a location outside the graph");
            return Response::unhandled();
        };
        self.locations.handle_with(chain, state, input, session)
    }
}

/// Root chain restricted to its labelled buttons
fn entry_chain(locations: &Locations, states: &StateTable, root: LocationId) -> HandlerChain {
    let Some(chain) = states.get(&root) else {
        return HandlerChain::default();
    };
    let labels = locations.get(root).map(Location::labels).unwrap_or_default();
    HandlerChain {
        filter: InputFilter::for_labels(labels),
        handlers: chain
            .handlers
            .iter()
            .filter(|handler| !matches!(handler, Handler::Fallback { .. }))
            .cloned()
            .collect(),
    }
}
