use iced::{
    widget::{button, column, row, scrollable, text, text_input, Space},
    Element, Length,
};

use crate::domain::ProgressState;

/// Main view state
pub struct FetchView {
    pub url: String,
    pub body: String,
    pub log: String,
    pub progress: ProgressState,
}

#[derive(Debug, Clone)]
pub enum FetchMessage {
    UrlChanged(String),
    FetchPressed,
    FetchBlockingPressed,
}

impl FetchView {
    pub fn new(default_url: &str) -> Self {
        Self {
            url: default_url.to_string(),
            body: "HTML will appear here.".to_string(),
            log: "Initialised.\n".to_string(),
            progress: ProgressState::Idle,
        }
    }

    /// Append one line to the log pane. The log only ever grows.
    pub fn push_log(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }

    fn status_line(&self) -> &str {
        match self.progress {
            ProgressState::Idle => "Idle.",
            ProgressState::InFlight => "Downloading...",
            ProgressState::Completed => "Done.",
        }
    }

    pub fn update(&mut self, message: FetchMessage) {
        match message {
            FetchMessage::UrlChanged(url) => {
                self.url = url;
            }
            FetchMessage::FetchPressed | FetchMessage::FetchBlockingPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn view(&self) -> Element<'_, FetchMessage> {
        column![
            text("Asynchronous Fetch Example").size(32),
            Space::new().height(Length::Fixed(20.0)),
            text("URL:").size(16),
            text_input("Enter a URL...", &self.url)
                .on_input(FetchMessage::UrlChanged)
                .padding(10),
            Space::new().height(Length::Fixed(10.0)),
            row![
                button("Fetch")
                    .on_press(FetchMessage::FetchPressed)
                    .padding([10, 20]),
                button("Fetch (Blocking)")
                    .on_press(FetchMessage::FetchBlockingPressed)
                    .padding([10, 20]),
            ]
            .spacing(10),
            text(self.status_line()).size(14),
            Space::new().height(Length::Fixed(10.0)),
            scrollable(text(&self.body).size(14)).height(Length::FillPortion(1)),
            scrollable(text(&self.log).size(14)).height(Length::FillPortion(1)),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}
