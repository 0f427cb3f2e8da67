use askama::Template;

#[derive(Template)]
#[template(path = "index.html")]
pub struct FrontPage;

/// GET /
pub async fn front_page() -> FrontPage {
    FrontPage
}
