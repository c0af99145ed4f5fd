use axum::response::Html;

// Public landing route
pub async fn welcome() -> Html<&'static str> {
    Html("<h1>Welcome</h1>")
}
