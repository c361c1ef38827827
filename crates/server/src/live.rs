// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live event streaming for dashboards and notifiers.
//!
//! Events report what a refresh cycle found. Clients still read the
//! published views over HTTP. A client may follow one student with
//! `/live?student_id=<id>`; cycle-wide events reach every client.

use axum::{
    extract::{
        Query, State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use chrono::{NaiveDateTime, Utc};
use futures::{Sink, SinkExt, stream::StreamExt};
use schulplan::NoveltyEvent;
use schulplan_changes::ChangeRecord;
use schulplan_domain::{GradeItem, HomeworkItem, StudentId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

/// Events buffered per subscriber before a slow one starts losing them.
const EVENT_BUFFER_SIZE: usize = 100;

/// Messages pushed to live clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A student's timetable differs from the previous cycle.
    ScheduleChanged {
        student_id: StudentId,
        change_count: usize,
        changes: Vec<ChangeRecord>,
    },
    HomeworkNew {
        student_id: StudentId,
        item: HomeworkItem,
    },
    GradeNew {
        student_id: StudentId,
        item: GradeItem,
    },
    /// A whole cycle failed; the previous views stay published.
    RefreshFailed {
        message: String,
        /// School-local time of the attempt.
        attempted_at: NaiveDateTime,
    },
    /// First message on every connection.
    Connected {
        /// Server time, RFC 3339.
        timestamp: String,
        /// The student this connection follows, if any.
        student_id: Option<StudentId>,
    },
}

impl LiveEvent {
    /// The student an event concerns. `None` for account-wide events.
    #[must_use]
    pub const fn student_id(&self) -> Option<StudentId> {
        match self {
            Self::ScheduleChanged { student_id, .. }
            | Self::HomeworkNew { student_id, .. }
            | Self::GradeNew { student_id, .. } => Some(*student_id),
            Self::RefreshFailed { .. } => None,
            Self::Connected { student_id, .. } => *student_id,
        }
    }

    /// Returns whether a client following `filter` should receive this event.
    #[must_use]
    pub fn concerns(&self, filter: Option<StudentId>) -> bool {
        match (filter, self.student_id()) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        }
    }
}

impl From<NoveltyEvent> for LiveEvent {
    fn from(event: NoveltyEvent) -> Self {
        match event {
            NoveltyEvent::HomeworkNew { student_id, item } => Self::HomeworkNew { student_id, item },
            NoveltyEvent::GradeNew { student_id, item } => Self::GradeNew { student_id, item },
        }
    }
}

/// Fan-out of live events to every connected client.
#[derive(Clone)]
pub struct LiveEventBroadcaster {
    tx: broadcast::Sender<LiveEvent>,
}

impl LiveEventBroadcaster {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Sends an event to current subscribers. Without subscribers it is dropped.
    pub fn broadcast(&self, event: &LiveEvent) {
        let receivers: usize = self.tx.send(event.clone()).unwrap_or(0);
        debug!(?event, receivers, "Broadcast live event");
    }

    /// Subscribes to events sent from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for LiveEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Query parameters of `/live`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LiveQuery {
    /// Only forward events about this student.
    pub student_id: Option<i64>,
}

/// Handler for GET `/live`.
///
/// # Arguments
///
/// * `ws` - The WebSocket upgrade request
/// * `query` - Optional student filter
/// * `broadcaster` - The broadcaster from application state
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<LiveQuery>,
    AxumState(broadcaster): AxumState<Arc<LiveEventBroadcaster>>,
) -> Response {
    let filter: Option<StudentId> = query.student_id.map(StudentId::new);
    let rx: broadcast::Receiver<LiveEvent> = broadcaster.subscribe();
    ws.on_upgrade(move |socket| stream_events(socket, rx, filter))
}

/// Sends one event as a JSON text frame. Returns `false` once the client is gone.
async fn send_event<S>(sink: &mut S, event: &LiveEvent) -> bool
where
    S: Sink<Message> + Unpin,
{
    match serde_json::to_string(event) {
        Ok(json) => sink.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Skipping live event that failed to serialize");
            true
        }
    }
}

async fn stream_events(
    socket: WebSocket,
    mut rx: broadcast::Receiver<LiveEvent>,
    filter: Option<StudentId>,
) {
    info!(student_id = ?filter, "Live client connected");
    let (mut sink, mut incoming) = socket.split();

    let hello: LiveEvent = LiveEvent::Connected {
        timestamp: Utc::now().to_rfc3339(),
        student_id: filter,
    };
    if !send_event(&mut sink, &hello).await {
        info!("Live client left before the greeting");
        return;
    }

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Ok(event) if event.concerns(filter) => {
                    if !send_event(&mut sink, &event).await {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live client too slow, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
            // Clients only listen; their frames matter only as a close signal.
            frame = incoming.next() => match frame {
                None | Some(Ok(Message::Close(_))) => break,
                Some(Err(e)) => {
                    debug!(error = %e, "Live socket read failed");
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    info!(student_id = ?filter, "Live client disconnected");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn homework() -> HomeworkItem {
        HomeworkItem {
            subject: String::from("Englisch"),
            content: String::from("Vokabeln"),
            date: NaiveDate::from_ymd_opt(2025, 9, 12).unwrap(),
        }
    }

    fn refresh_failed() -> LiveEvent {
        LiveEvent::RefreshFailed {
            message: String::from("Upstream error: portal did not answer"),
            attempted_at: NaiveDate::from_ymd_opt(2025, 9, 11)
                .unwrap()
                .and_hms_opt(7, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_broadcast_without_subscribers_is_dropped() {
        let broadcaster = LiveEventBroadcaster::new();
        broadcaster.broadcast(&LiveEvent::HomeworkNew {
            student_id: StudentId::new(1),
            item: homework(),
        });
    }

    #[test]
    fn test_every_subscriber_receives_events() {
        let broadcaster = LiveEventBroadcaster::new();
        let mut first = broadcaster.subscribe();
        let mut second = broadcaster.subscribe();

        broadcaster.broadcast(&LiveEvent::ScheduleChanged {
            student_id: StudentId::new(1),
            change_count: 0,
            changes: Vec::new(),
        });

        assert!(matches!(first.try_recv(), Ok(LiveEvent::ScheduleChanged { .. })));
        assert!(matches!(second.try_recv(), Ok(LiveEvent::ScheduleChanged { .. })));
    }

    #[test]
    fn test_novelty_converts_to_live_event() {
        let event: LiveEvent = NoveltyEvent::HomeworkNew {
            student_id: StudentId::new(4711),
            item: homework(),
        }
        .into();

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "homework_new");
        assert_eq!(json["student_id"], 4711);
        assert_eq!(json["item"]["content"], "Vokabeln");
    }

    #[test]
    fn test_student_filter() {
        let for_mia: LiveEvent = LiveEvent::HomeworkNew {
            student_id: StudentId::new(4711),
            item: homework(),
        };

        assert!(for_mia.concerns(None));
        assert!(for_mia.concerns(Some(StudentId::new(4711))));
        assert!(!for_mia.concerns(Some(StudentId::new(4712))));
        assert!(refresh_failed().concerns(Some(StudentId::new(4712))));
    }
}
