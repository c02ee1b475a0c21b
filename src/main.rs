mod api;
mod app;
mod application;
mod domain;
mod ui;

use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    iced::application(app::FetchApp::default, app::update, app::view)
        .title("Asynchronous Fetch Example")
        .run()
}
