//! Model-based testing fixture
//!
//! The site is described as a finite state machine: vertices are page
//! states with a verification (`v_*`), edges are user actions (`e_*`). A
//! graph walker, built in or external, picks a path and the
//! [`ModelHarness`] performs each action and checks each state reached.
//!
//! Some edges carry a [`Guard`] over a small [`ModelContext`] so that a
//! walk never asks the site for something it cannot do, such as opening an
//! already-read message.

pub mod graphwalker;
pub mod harness;

pub use graphwalker::{GraphWalkerFile, GraphWalkerModel};
pub use harness::{ModelData, ModelHarness};

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use booker_common::ContactField;

use crate::error::{E2eError, E2eResult};

/// A page state (GraphWalker vertex)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelState {
    Start,
    FrontpageCanContact,
    ContactSuccessful,
    ContactUnsuccessful,
    AdminLogin,
    AdminRooms,
    AdminMessages,
    MessageDetails,
    BookingDialog,
    BookingConfirmed,
}

impl ModelState {
    pub const ALL: [ModelState; 10] = [
        ModelState::Start,
        ModelState::FrontpageCanContact,
        ModelState::ContactSuccessful,
        ModelState::ContactUnsuccessful,
        ModelState::AdminLogin,
        ModelState::AdminRooms,
        ModelState::AdminMessages,
        ModelState::MessageDetails,
        ModelState::BookingDialog,
        ModelState::BookingConfirmed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelState::Start => "v_start",
            ModelState::FrontpageCanContact => "v_frontpage_can_contact",
            ModelState::ContactSuccessful => "v_contact_successful",
            ModelState::ContactUnsuccessful => "v_contact_unsuccessful",
            ModelState::AdminLogin => "v_admin_login",
            ModelState::AdminRooms => "v_admin_rooms",
            ModelState::AdminMessages => "v_admin_messages",
            ModelState::MessageDetails => "v_message_details",
            ModelState::BookingDialog => "v_booking_dialog",
            ModelState::BookingConfirmed => "v_booking_confirmed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A user action (GraphWalker edge)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Transition {
    LoadFrontpage,
    SubmitValidContactData,
    SubmitInvalidContactData,
    SubmitInvalidContactName,
    SubmitInvalidContactEmail,
    SubmitInvalidContactPhone,
    SubmitInvalidContactSubject,
    SubmitInvalidContactMessage,
    ClickAdminPanel,
    AdminCorrectLogin,
    AdminClickInbox,
    AdminClickRooms,
    ClickLastMessage,
    CloseMessageDetails,
    ClickFrontpage,
    OpenBookingDialog,
    SubmitValidBooking,
    CancelBooking,
}

impl Transition {
    pub const ALL: [Transition; 18] = [
        Transition::LoadFrontpage,
        Transition::SubmitValidContactData,
        Transition::SubmitInvalidContactData,
        Transition::SubmitInvalidContactName,
        Transition::SubmitInvalidContactEmail,
        Transition::SubmitInvalidContactPhone,
        Transition::SubmitInvalidContactSubject,
        Transition::SubmitInvalidContactMessage,
        Transition::ClickAdminPanel,
        Transition::AdminCorrectLogin,
        Transition::AdminClickInbox,
        Transition::AdminClickRooms,
        Transition::ClickLastMessage,
        Transition::CloseMessageDetails,
        Transition::ClickFrontpage,
        Transition::OpenBookingDialog,
        Transition::SubmitValidBooking,
        Transition::CancelBooking,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Transition::LoadFrontpage => "e_load_frontpage",
            Transition::SubmitValidContactData => "e_submit_valid_contact_data",
            Transition::SubmitInvalidContactData => "e_submit_invalid_contact_data",
            Transition::SubmitInvalidContactName => "e_submit_invalid_contact_name",
            Transition::SubmitInvalidContactEmail => "e_submit_invalid_contact_email",
            Transition::SubmitInvalidContactPhone => "e_submit_invalid_contact_phone",
            Transition::SubmitInvalidContactSubject => "e_submit_invalid_contact_subject",
            Transition::SubmitInvalidContactMessage => "e_submit_invalid_contact_message",
            Transition::ClickAdminPanel => "e_click_admin_panel",
            Transition::AdminCorrectLogin => "e_admin_correct_login",
            Transition::AdminClickInbox => "e_admin_click_inbox",
            Transition::AdminClickRooms => "e_admin_click_rooms",
            Transition::ClickLastMessage => "e_click_last_message",
            Transition::CloseMessageDetails => "e_close_message_details",
            Transition::ClickFrontpage => "e_click_frontpage",
            Transition::OpenBookingDialog => "e_open_booking_dialog",
            Transition::SubmitValidBooking => "e_submit_valid_booking",
            Transition::CancelBooking => "e_cancel_booking",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// The contact field this action deliberately breaks, if any
    pub fn invalid_field(&self) -> Option<ContactField> {
        match self {
            Transition::SubmitInvalidContactName => Some(ContactField::Name),
            Transition::SubmitInvalidContactEmail => Some(ContactField::Email),
            Transition::SubmitInvalidContactPhone => Some(ContactField::Phone),
            Transition::SubmitInvalidContactSubject => Some(ContactField::Subject),
            Transition::SubmitInvalidContactMessage => Some(ContactField::Description),
            _ => None,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Condition an edge needs before it can be taken
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Guard {
    #[default]
    Always,
    LoggedIn,
    LoggedOut,
    UnreadMessage,
    NotBooked,
}

impl Guard {
    /// Parse a guard expression as written in model files
    pub fn from_expr(expr: &str) -> E2eResult<Self> {
        match expr.replace(' ', "").as_str() {
            "" | "true" => Ok(Guard::Always),
            "logged_in" => Ok(Guard::LoggedIn),
            "!logged_in" => Ok(Guard::LoggedOut),
            "unread_message" => Ok(Guard::UnreadMessage),
            "!booked" => Ok(Guard::NotBooked),
            other => Err(E2eError::InvalidModel(format!("unsupported guard '{}'", other))),
        }
    }

    pub fn expr(&self) -> Option<&'static str> {
        match self {
            Guard::Always => None,
            Guard::LoggedIn => Some("logged_in"),
            Guard::LoggedOut => Some("!logged_in"),
            Guard::UnreadMessage => Some("unread_message"),
            Guard::NotBooked => Some("!booked"),
        }
    }
}

/// What a walk has done to the site so far, as far as guards care
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelContext {
    pub logged_in: bool,
    pub unread_message: bool,
    pub booked: bool,
}

impl ModelContext {
    pub fn allows(&self, guard: Guard) -> bool {
        match guard {
            Guard::Always => true,
            Guard::LoggedIn => self.logged_in,
            Guard::LoggedOut => !self.logged_in,
            Guard::UnreadMessage => self.unread_message,
            Guard::NotBooked => !self.booked,
        }
    }

    /// Record the effect of taking `transition`
    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::SubmitValidContactData => self.unread_message = true,
            Transition::ClickLastMessage => self.unread_message = false,
            Transition::AdminCorrectLogin => self.logged_in = true,
            Transition::SubmitValidBooking => self.booked = true,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub from: ModelState,
    pub transition: Transition,
    pub to: ModelState,
    #[serde(default)]
    pub guard: Guard,
}

impl Edge {
    pub fn new(from: ModelState, transition: Transition, to: ModelState) -> Self {
        Self {
            from,
            transition,
            to,
            guard: Guard::Always,
        }
    }

    pub fn guarded(from: ModelState, transition: Transition, to: ModelState, guard: Guard) -> Self {
        Self {
            from,
            transition,
            to,
            guard,
        }
    }
}

/// The built-in models, named like the model classes an external walker calls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    ContactForm,
    ContactFormDetailed,
    MessageBackoffice,
    Booking,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::ContactForm,
        ModelKind::ContactFormDetailed,
        ModelKind::MessageBackoffice,
        ModelKind::Booking,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::ContactForm => "ContactForm",
            ModelKind::ContactFormDetailed => "ContactFormDetailed",
            ModelKind::MessageBackoffice => "MessageBackoffice",
            ModelKind::Booking => "Booking",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn graph(&self) -> ModelGraph {
        use ModelState as S;
        use Transition as T;

        let mut edges = vec![Edge::new(S::Start, T::LoadFrontpage, S::FrontpageCanContact)];

        match self {
            ModelKind::ContactForm => {
                edges.extend([
                    Edge::new(S::FrontpageCanContact, T::SubmitValidContactData, S::ContactSuccessful),
                    Edge::new(S::FrontpageCanContact, T::SubmitInvalidContactData, S::ContactUnsuccessful),
                    Edge::new(S::ContactSuccessful, T::LoadFrontpage, S::FrontpageCanContact),
                    Edge::new(S::ContactUnsuccessful, T::LoadFrontpage, S::FrontpageCanContact),
                ]);
            }
            ModelKind::ContactFormDetailed => {
                edges.push(Edge::new(S::FrontpageCanContact, T::SubmitValidContactData, S::ContactSuccessful));
                edges.extend(
                    T::ALL
                        .into_iter()
                        .filter(|t| t.invalid_field().is_some())
                        .map(|t| Edge::new(S::FrontpageCanContact, t, S::ContactUnsuccessful)),
                );
                edges.extend([
                    Edge::new(S::ContactSuccessful, T::LoadFrontpage, S::FrontpageCanContact),
                    Edge::new(S::ContactUnsuccessful, T::LoadFrontpage, S::FrontpageCanContact),
                ]);
            }
            ModelKind::MessageBackoffice => {
                edges.extend([
                    Edge::new(S::FrontpageCanContact, T::SubmitValidContactData, S::ContactSuccessful),
                    Edge::new(S::ContactSuccessful, T::LoadFrontpage, S::FrontpageCanContact),
                    Edge::guarded(S::ContactSuccessful, T::ClickAdminPanel, S::AdminLogin, Guard::LoggedOut),
                    Edge::guarded(S::ContactSuccessful, T::ClickAdminPanel, S::AdminRooms, Guard::LoggedIn),
                    Edge::new(S::AdminLogin, T::AdminCorrectLogin, S::AdminRooms),
                    Edge::new(S::AdminRooms, T::AdminClickInbox, S::AdminMessages),
                    Edge::new(S::AdminMessages, T::AdminClickRooms, S::AdminRooms),
                    Edge::guarded(S::AdminMessages, T::ClickLastMessage, S::MessageDetails, Guard::UnreadMessage),
                    Edge::new(S::MessageDetails, T::CloseMessageDetails, S::AdminMessages),
                    Edge::new(S::AdminRooms, T::ClickFrontpage, S::FrontpageCanContact),
                    Edge::new(S::AdminMessages, T::ClickFrontpage, S::FrontpageCanContact),
                ]);
            }
            ModelKind::Booking => {
                edges.extend([
                    Edge::new(S::FrontpageCanContact, T::OpenBookingDialog, S::BookingDialog),
                    Edge::new(S::BookingDialog, T::CancelBooking, S::FrontpageCanContact),
                    Edge::guarded(S::BookingDialog, T::SubmitValidBooking, S::BookingConfirmed, Guard::NotBooked),
                    Edge::new(S::BookingConfirmed, T::LoadFrontpage, S::FrontpageCanContact),
                ]);
            }
        }

        ModelGraph {
            name: self.name().to_string(),
            start: S::Start,
            edges,
        }
    }
}

/// States and guarded transitions of one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelGraph {
    pub name: String,
    pub start: ModelState,
    pub edges: Vec<Edge>,
}

impl ModelGraph {
    /// Every state mentioned by the graph
    pub fn states(&self) -> BTreeSet<ModelState> {
        let mut states: BTreeSet<ModelState> = self
            .edges
            .iter()
            .flat_map(|e| [e.from, e.to])
            .collect();
        states.insert(self.start);
        states
    }

    /// Edges leaving `state` that `ctx` allows
    pub fn edges_from(&self, state: ModelState, ctx: &ModelContext) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.from == state && ctx.allows(e.guard))
            .collect()
    }

    /// State reached by taking `transition` from `state`
    pub fn target(&self, state: ModelState, transition: Transition, ctx: &ModelContext) -> Option<ModelState> {
        self.edges_from(state, ctx)
            .into_iter()
            .find(|e| e.transition == transition)
            .map(|e| e.to)
    }

    /// Structural checks: everything reachable from the start, no dead ends,
    /// no transition ambiguous under the same guard
    pub fn check(&self) -> E2eResult<()> {
        if self.edges.is_empty() {
            return Err(E2eError::InvalidModel(format!("model '{}' has no edges", self.name)));
        }

        let mut seen = HashSet::new();
        for edge in &self.edges {
            if !seen.insert((edge.from, edge.transition, edge.guard)) {
                return Err(E2eError::InvalidModel(format!(
                    "model '{}': '{}' leaves '{}' twice under the same guard",
                    self.name, edge.transition, edge.from
                )));
            }
        }

        let mut reachable = HashSet::from([self.start]);
        let mut queue = VecDeque::from([self.start]);
        while let Some(state) = queue.pop_front() {
            for edge in self.edges.iter().filter(|e| e.from == state) {
                if reachable.insert(edge.to) {
                    queue.push_back(edge.to);
                }
            }
        }

        for state in self.states() {
            if !reachable.contains(&state) {
                return Err(E2eError::InvalidModel(format!(
                    "model '{}': '{}' is unreachable from '{}'",
                    self.name, state, self.start
                )));
            }
            if !self.edges.iter().any(|e| e.from == state) {
                return Err(E2eError::InvalidModel(format!(
                    "model '{}': '{}' is a dead end",
                    self.name, state
                )));
            }
        }

        Ok(())
    }

    /// Replay `path` from the start, returning the final state
    pub fn validate_path(&self, path: &[Transition]) -> E2eResult<ModelState> {
        let mut state = self.start;
        let mut ctx = ModelContext::default();
        for &transition in path {
            state = self
                .target(state, transition, &ctx)
                .ok_or_else(|| E2eError::InvalidTransition {
                    state: state.to_string(),
                    transition: transition.to_string(),
                })?;
            ctx.apply(transition);
        }
        Ok(state)
    }

    /// Random walk from the start until every edge has been taken or
    /// `max_steps` is reached
    pub fn random_path<R: Rng + ?Sized>(&self, rng: &mut R, max_steps: usize) -> Vec<Transition> {
        let mut path = Vec::new();
        let mut state = self.start;
        let mut ctx = ModelContext::default();
        let mut uncovered: HashSet<&Edge> = self.edges.iter().collect();

        while path.len() < max_steps && !uncovered.is_empty() {
            let options = self.edges_from(state, &ctx);
            // prefer edges not taken yet, like an edge-coverage generator
            let fresh: Vec<&Edge> = options.iter().copied().filter(|e| uncovered.contains(e)).collect();
            let pool = if fresh.is_empty() { &options } else { &fresh };
            let Some(edge) = pool.choose(rng).copied() else {
                break;
            };

            uncovered.remove(edge);
            path.push(edge.transition);
            ctx.apply(edge.transition);
            state = edge.to;
        }

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_names_round_trip() {
        for state in ModelState::ALL {
            assert_eq!(ModelState::from_name(state.name()), Some(state));
            assert!(state.name().starts_with("v_"));
        }
        for transition in Transition::ALL {
            assert_eq!(Transition::from_name(transition.name()), Some(transition));
            assert!(transition.name().starts_with("e_"));
        }
        assert_eq!(Transition::from_name("e_fly_away"), None);
    }

    #[test]
    fn test_builtin_graphs_are_well_formed() {
        for kind in ModelKind::ALL {
            kind.graph().check().unwrap_or_else(|e| panic!("{}: {}", kind.name(), e));
        }
    }

    #[test]
    fn test_admin_panel_depends_on_login() {
        let graph = ModelKind::MessageBackoffice.graph();
        let mut ctx = ModelContext::default();
        assert_eq!(
            graph.target(ModelState::ContactSuccessful, Transition::ClickAdminPanel, &ctx),
            Some(ModelState::AdminLogin)
        );
        ctx.apply(Transition::AdminCorrectLogin);
        assert_eq!(
            graph.target(ModelState::ContactSuccessful, Transition::ClickAdminPanel, &ctx),
            Some(ModelState::AdminRooms)
        );
    }

    #[test]
    fn test_message_opens_once_per_submission() {
        use Transition as T;
        let graph = ModelKind::MessageBackoffice.graph();
        let path = [
            T::LoadFrontpage,
            T::SubmitValidContactData,
            T::ClickAdminPanel,
            T::AdminCorrectLogin,
            T::AdminClickInbox,
            T::ClickLastMessage,
            T::CloseMessageDetails,
        ];
        assert_eq!(graph.validate_path(&path).unwrap(), ModelState::AdminMessages);

        let mut again = path.to_vec();
        again.push(T::ClickLastMessage);
        assert!(matches!(
            graph.validate_path(&again),
            Err(E2eError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_detailed_model_covers_every_field() {
        let graph = ModelKind::ContactFormDetailed.graph();
        let ctx = ModelContext::default();
        let fields: BTreeSet<_> = graph
            .edges_from(ModelState::FrontpageCanContact, &ctx)
            .into_iter()
            .filter_map(|e| e.transition.invalid_field())
            .map(|f| f.name())
            .collect();
        assert_eq!(fields.len(), ContactField::ALL.len());
    }

    #[test]
    fn test_random_paths_are_valid_and_covering() {
        for kind in ModelKind::ALL {
            let graph = kind.graph();
            let mut rng = StdRng::seed_from_u64(1234);
            let path = graph.random_path(&mut rng, 500);
            graph.validate_path(&path).unwrap();
            let taken: HashSet<Transition> = path.iter().copied().collect();
            for edge in &graph.edges {
                if edge.guard == Guard::Always {
                    assert!(taken.contains(&edge.transition), "{} never took {}", kind.name(), edge.transition);
                }
            }
        }
    }

    #[test]
    fn test_random_path_respects_limit() {
        let graph = ModelKind::ContactForm.graph();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(graph.random_path(&mut rng, 2).len(), 2);
        assert!(graph.random_path(&mut rng, 0).is_empty());
    }

    #[test]
    fn test_guard_exprs() {
        for guard in [Guard::LoggedIn, Guard::LoggedOut, Guard::UnreadMessage, Guard::NotBooked] {
            assert_eq!(Guard::from_expr(guard.expr().unwrap()).unwrap(), guard);
        }
        assert_eq!(Guard::from_expr("").unwrap(), Guard::Always);
        assert!(Guard::from_expr("global.x > 3").is_err());
    }

    #[test]
    fn test_check_rejects_dead_end() {
        let graph = ModelGraph {
            name: "broken".to_string(),
            start: ModelState::Start,
            edges: vec![Edge::new(ModelState::Start, Transition::LoadFrontpage, ModelState::FrontpageCanContact)],
        };
        assert!(matches!(graph.check(), Err(E2eError::InvalidModel(m)) if m.contains("dead end")));
    }
}
