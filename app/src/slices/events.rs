//! Events slice: event catalog, venues, and speakers
//!
//! Fetches replace the held snapshot wholesale, so refetching is
//! idempotent. Authoring operations (create, update, delete) patch the
//! held collections in place from the gateway's returned rows.

use crate::environment::AppEnvironment;
use crate::types::{Event, EventId, EventPatch, NewEvent, Speaker, Venue, VenueId};
use boxoffice_core::effect::Effect;
use boxoffice_core::reducer::Reducer;
use boxoffice_core::{Effects, smallvec};

/// Events slice state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventsState {
    /// All known events, soonest first
    pub events: Vec<Event>,
    /// Event currently being viewed
    pub current_event: Option<Event>,
    /// All known venues, alphabetical
    pub venues: Vec<Venue>,
    /// Venue currently being viewed
    pub current_venue: Option<Venue>,
    /// Speakers for the event currently being viewed
    pub speakers: Vec<Speaker>,
    /// An events operation is in flight
    pub loading: bool,
    /// Last failure, user-facing
    pub error: Option<String>,
}

/// Events slice actions
#[derive(Debug, Clone)]
pub enum EventsAction {
    /// Fetch the full event catalog
    FetchEvents,
    /// Fetch one event by id
    FetchEvent(EventId),
    /// Fetch all venues
    FetchVenues,
    /// Fetch one venue by id
    FetchVenue(VenueId),
    /// Fetch the speakers for an event
    FetchSpeakers(EventId),
    /// Create an event
    CreateEvent(NewEvent),
    /// Apply a partial update to an event
    UpdateEvent(EventId, EventPatch),
    /// Delete an event
    DeleteEvent(EventId),

    /// Catalog fetch finished
    EventsLoaded(Vec<Event>),
    /// Single event fetch finished
    EventLoaded(Event),
    /// Venues fetch finished
    VenuesLoaded(Vec<Venue>),
    /// Single venue fetch finished
    VenueLoaded(Venue),
    /// Speakers fetch finished
    SpeakersLoaded(Vec<Speaker>),
    /// Create finished
    EventCreated(Event),
    /// Update finished
    EventUpdated(Event),
    /// Delete finished
    EventDeleted(EventId),
    /// Any events operation failed
    Failed(String),

    /// Dismiss the stored error
    ClearError,
    /// Drop the currently viewed event, venue, and speakers
    ClearCurrent,
}

/// Reducer for the events slice
#[derive(Debug, Clone, Copy, Default)]
pub struct EventsReducer;

impl Reducer for EventsReducer {
    type State = EventsState;
    type Action = EventsAction;
    type Environment = AppEnvironment;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut EventsState,
        action: EventsAction,
        env: &AppEnvironment,
    ) -> Effects<EventsAction> {
        match action {
            EventsAction::FetchEvents => {
                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.fetch_events().await {
                        Ok(events) => EventsAction::EventsLoaded(events),
                        Err(e) => EventsAction::Failed(e.to_string()),
                    })
                }))]
            },

            EventsAction::FetchEvent(id) => {
                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.fetch_event(id).await {
                        Ok(event) => EventsAction::EventLoaded(event),
                        Err(e) => EventsAction::Failed(e.to_string()),
                    })
                }))]
            },

            EventsAction::FetchVenues => {
                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.fetch_venues().await {
                        Ok(venues) => EventsAction::VenuesLoaded(venues),
                        Err(e) => EventsAction::Failed(e.to_string()),
                    })
                }))]
            },

            EventsAction::FetchVenue(id) => {
                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.fetch_venue(id).await {
                        Ok(venue) => EventsAction::VenueLoaded(venue),
                        Err(e) => EventsAction::Failed(e.to_string()),
                    })
                }))]
            },

            EventsAction::FetchSpeakers(event_id) => {
                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.fetch_speakers(event_id).await {
                        Ok(speakers) => EventsAction::SpeakersLoaded(speakers),
                        Err(e) => EventsAction::Failed(e.to_string()),
                    })
                }))]
            },

            EventsAction::CreateEvent(event) => {
                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.create_event(event).await {
                        Ok(created) => EventsAction::EventCreated(created),
                        Err(e) => EventsAction::Failed(e.to_string()),
                    })
                }))]
            },

            EventsAction::UpdateEvent(id, patch) => {
                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.update_event(id, patch).await {
                        Ok(updated) => EventsAction::EventUpdated(updated),
                        Err(e) => EventsAction::Failed(e.to_string()),
                    })
                }))]
            },

            EventsAction::DeleteEvent(id) => {
                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.delete_event(id).await {
                        Ok(()) => EventsAction::EventDeleted(id),
                        Err(e) => EventsAction::Failed(e.to_string()),
                    })
                }))]
            },

            EventsAction::EventsLoaded(events) => {
                state.loading = false;
                state.events = events;
                smallvec![]
            },

            EventsAction::EventLoaded(event) => {
                state.loading = false;
                state.current_event = Some(event);
                smallvec![]
            },

            EventsAction::VenuesLoaded(venues) => {
                state.loading = false;
                state.venues = venues;
                smallvec![]
            },

            EventsAction::VenueLoaded(venue) => {
                state.loading = false;
                state.current_venue = Some(venue);
                smallvec![]
            },

            EventsAction::SpeakersLoaded(speakers) => {
                state.loading = false;
                state.speakers = speakers;
                smallvec![]
            },

            EventsAction::EventCreated(event) => {
                state.loading = false;
                state.events.push(event);
                state.events.sort_by_key(|e| e.date);
                smallvec![]
            },

            EventsAction::EventUpdated(event) => {
                state.loading = false;
                if let Some(held) =
                    state.events.iter_mut().find(|e| e.event_id == event.event_id)
                {
                    *held = event.clone();
                }
                if state
                    .current_event
                    .as_ref()
                    .is_some_and(|e| e.event_id == event.event_id)
                {
                    state.current_event = Some(event);
                }
                smallvec![]
            },

            EventsAction::EventDeleted(id) => {
                state.loading = false;
                state.events.retain(|e| e.event_id != id);
                if state
                    .current_event
                    .as_ref()
                    .is_some_and(|e| e.event_id == id)
                {
                    state.current_event = None;
                }
                smallvec![]
            },

            EventsAction::Failed(message) => {
                tracing::warn!(error = %message, "Events operation failed");
                state.loading = false;
                state.error = Some(message);
                smallvec![]
            },

            EventsAction::ClearError => {
                state.error = None;
                smallvec![]
            },

            EventsAction::ClearCurrent => {
                state.current_event = None;
                state.current_venue = None;
                state.speakers.clear();
                smallvec![]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::test_environment;
    use chrono::Utc;

    fn sample_event(id: i64) -> Event {
        Event {
            event_id: EventId(id),
            name: format!("Event {id}"),
            description: String::new(),
            location: "Main Hall".to_string(),
            date: Utc::now(),
            time: "19:00".to_string(),
            venue_id: VenueId(1),
            image_url: None,
        }
    }

    #[test]
    fn loaded_events_replace_the_snapshot() {
        let mut state = EventsState {
            events: vec![sample_event(1)],
            loading: true,
            ..EventsState::default()
        };

        let effects = EventsReducer.reduce(
            &mut state,
            EventsAction::EventsLoaded(vec![sample_event(2), sample_event(3)]),
            &test_environment(),
        );

        assert!(effects.is_empty());
        assert!(!state.loading);
        assert_eq!(state.events.len(), 2);
        assert_eq!(state.events[0].event_id, EventId(2));
    }

    #[test]
    fn speakers_fetch_tracks_loading() {
        let mut state = EventsState::default();
        let env = test_environment();

        let effects =
            EventsReducer.reduce(&mut state, EventsAction::FetchSpeakers(EventId(1)), &env);
        assert_eq!(effects.len(), 1);
        assert!(state.loading);

        let effects =
            EventsReducer.reduce(&mut state, EventsAction::SpeakersLoaded(vec![]), &env);
        assert!(effects.is_empty());
        assert!(!state.loading);
    }

    #[test]
    fn deleting_the_current_event_clears_it() {
        let mut state = EventsState {
            events: vec![sample_event(1), sample_event(2)],
            current_event: Some(sample_event(1)),
            ..EventsState::default()
        };

        EventsReducer.reduce(
            &mut state,
            EventsAction::EventDeleted(EventId(1)),
            &test_environment(),
        );

        assert_eq!(state.events.len(), 1);
        assert!(state.current_event.is_none());
    }
}
