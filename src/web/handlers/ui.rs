use axum::response::{Html, IntoResponse};

use crate::web::static_files::get_embedded_file;

// Chat page with the connection form in the sidebar
pub async fn index_handler() -> impl IntoResponse {
    match get_embedded_file("index.html") {
        Some(content) => Html(content).into_response(),
        None => Html("<html><body><h1>SQL Chat</h1><p>Error: index.html not found</p></body></html>")
            .into_response(),
    }
}
