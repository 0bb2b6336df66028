//! Live feed handler
//!
//! Pushes the re-rendered feed to the browser over Server-Sent Events every
//! time the Record Store delivers a new snapshot.

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::Stream;
use tokio_stream::{wrappers::WatchStream, StreamExt};

use crate::app::now_millis;
use crate::domain::ports::RecordStore;
use crate::error::AppError;
use crate::feed::FeedUpdate;
use crate::handlers::ideas::FeedQuery;
use crate::AppState;

/// GET /ideas/stream
///
/// One `feed` event per snapshot, starting with the current one. The data is
/// a JSON `FeedUpdate` with the rendered fragment and the total idea count.
pub async fn stream_feed<S>(
    State(state): State<AppState<S>>,
    Query(query): Query<FeedQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError>
where
    S: RecordStore + 'static,
{
    let mode = query.mode()?;
    let feed_service = state.feed_service.clone();

    let events = WatchStream::new(state.feed_service.changes()).map(move |snapshot| {
        let feed = feed_service.build_feed(&snapshot, mode, now_millis());
        Event::default()
            .event("feed")
            .json_data(FeedUpdate::new(&feed))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
