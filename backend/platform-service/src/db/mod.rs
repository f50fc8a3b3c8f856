/// Database repositories
///
/// Free async functions over `&PgPool`, one module per aggregate.
pub mod comments;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;
