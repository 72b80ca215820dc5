//! conduit/crates/services/src/lib.rs
//!
//! Use cases of the publishing backend. Every service talks to the graph
//! only through the [`domains::GraphExecutor`] port and returns
//! view-models; marshalling to JSON happens at the edge.

pub mod articles;
pub mod comments;
pub mod cypher;
pub mod feed;
pub mod profiles;
pub mod tags;
pub mod users;
pub mod validation;

use std::sync::Arc;

use domains::{GraphExecutor, PasswordHasher, TokenIssuer};

pub use articles::ArticleService;
pub use comments::CommentService;
pub use feed::{FeedFilter, FeedScope};
pub use profiles::ProfileService;
pub use tags::TagService;
pub use users::{UserService, UserSession};
pub use validation::{ArticleInput, CommentInput, Login, Registration};

/// All services, built once at startup and shared by request handlers.
pub struct AppServices {
    pub users: UserService,
    pub profiles: ProfileService,
    pub articles: ArticleService,
    pub comments: CommentService,
    pub tags: TagService,
}

impl AppServices {
    pub fn new(
        graph: Arc<dyn GraphExecutor>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users: UserService::new(Arc::clone(&graph), hasher, tokens),
            profiles: ProfileService::new(Arc::clone(&graph)),
            articles: ArticleService::new(Arc::clone(&graph)),
            comments: CommentService::new(Arc::clone(&graph)),
            tags: TagService::new(graph),
        }
    }
}
