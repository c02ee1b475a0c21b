use std::sync::Arc;

use futures::StreamExt;
use iced::Task;

use crate::api::{FetchConfig, HttpClient};
use crate::application::{ChannelObserver, FetchController, FetchEvent};
use crate::ui::{FetchMessage, FetchView};

pub struct FetchApp {
    view: FetchView,
    controller: FetchController,
    // Indicator and body pane follow the most recently issued request only
    latest_request: Option<u64>,
}

impl Default for FetchApp {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchApp {
    pub fn new() -> Self {
        let config = FetchConfig::default();
        let view = FetchView::new(&config.default_url);
        let controller = FetchController::new(Arc::new(HttpClient::new(config)));

        Self {
            view,
            controller,
            latest_request: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(FetchMessage),
    FetchEvent(FetchEvent),
}

pub fn update(app: &mut FetchApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                FetchMessage::FetchPressed => {
                    app.view.push_log("Button pressed.");

                    if app.view.url.is_empty() {
                        app.view.push_log("Enter a URL first.");
                        return Task::none();
                    }

                    // Overlapping fetches are allowed; each gets its own id
                    // and each runs to completion on the executor.
                    let request = app.controller.issue(app.view.url.clone());
                    app.latest_request = Some(request.id);

                    return Task::stream(
                        app.controller
                            .fetch_stream(request)
                            .map(Message::FetchEvent),
                    );
                }
                FetchMessage::FetchBlockingPressed => {
                    app.view.push_log("Button pressed (blocking).");

                    if app.view.url.is_empty() {
                        app.view.push_log("Enter a URL first.");
                        return Task::none();
                    }

                    let request = app.controller.issue(app.view.url.clone());
                    app.latest_request = Some(request.id);

                    // Holds the update loop for the whole round trip; the
                    // queued events drain afterwards, in order.
                    let (observer, events) = ChannelObserver::unbounded();
                    app.controller.fetch_blocking(&request, &observer);
                    drop(observer);

                    return Task::stream(events.map(Message::FetchEvent));
                }
                FetchMessage::UrlChanged(_) => {}
            }
        }
        Message::FetchEvent(event) => match event {
            FetchEvent::Log(line) => app.view.push_log(&line),
            FetchEvent::StateChanged(request, state) => {
                if app.latest_request == Some(request.id) {
                    app.view.progress = state;
                }
            }
            FetchEvent::BodyReceived(request, body) => {
                if app.latest_request == Some(request.id) {
                    app.view.body = body;
                }
            }
        },
    }
    Task::none()
}

pub fn view(app: &FetchApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}
