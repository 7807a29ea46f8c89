//! The chat controller driving a live server through the in-memory page.

mod common;

use tokio::net::TcpListener;
use url::Url;

use laiser::AppState;
use laiser::contract::SEARCH_PATH;
use laiser::server::router;
use laiser::ui::{
    ChatController, ChatDom, Direction, Display, HttpSearchClient, Indicator, MemoryClipboard,
    MemoryDom, MessageControl, SendOutcome, SubmitOutcome,
};

use common::{FakeLlm, state};

type Controller = ChatController<MemoryDom, MemoryClipboard, HttpSearchClient>;

async fn serve(app_state: AppState) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(app_state)).await.unwrap();
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

fn controller(base: &Url) -> Controller {
    let client = HttpSearchClient::new(base).unwrap();
    ChatController::new(MemoryDom::new(1000.0), MemoryClipboard::default(), client)
}

async fn ask(controller: &Controller, question: &str) -> String {
    controller.dom().type_text(question);
    match controller.send().await.unwrap() {
        SendOutcome::Submitted(SubmitOutcome::Delivered { message_id }) => message_id,
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_question_round_trip() {
    let base = serve(state(FakeLlm::replying("Rust is a language. It is"))).await;
    let controller = controller(&base);
    controller.on_load().unwrap();
    assert!(controller.dom().is_focused());

    let id = ask(&controller, "  what is rust?  ").await;

    let messages = controller.dom().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].message.direction, Direction::Sent);
    assert_eq!(messages[0].message.body, "what is rust?");
    assert_eq!(messages[1].message.id, id);
    assert_eq!(messages[1].message.direction, Direction::Received);
    assert_eq!(messages[1].controls, MessageControl::ALL.to_vec());

    assert_eq!(controller.dom().answer_text(&id).unwrap(), "Rust is a language.");
    assert_eq!(controller.dom().indicator(), Indicator::Idle);
    assert_eq!(controller.dom().input_value().unwrap(), "");
    assert!(controller.dom().is_scrolled_to_bottom());
}

#[tokio::test]
async fn test_blank_input_sends_nothing() {
    let base = serve(state(FakeLlm::replying("unused."))).await;
    let controller = controller(&base);

    controller.dom().type_text(" \n\t ");
    assert_eq!(controller.send().await.unwrap(), SendOutcome::Ignored);
    assert!(controller.dom().messages().is_empty());
}

#[tokio::test]
async fn test_toggle_and_copy_use_server_markup() {
    let base = serve(state(FakeLlm::replying("Answer text."))).await;
    let controller = controller(&base);
    let id = ask(&controller, "rust").await;

    assert_eq!(controller.toggle_sources(&id).unwrap(), Display::Block);
    assert_eq!(controller.toggle_sources(&id).unwrap(), Display::None);
    assert!(!controller.dom().sources_display(&id).unwrap().is_visible());

    assert_eq!(controller.copy_answer(&id).unwrap(), "Answer text.");
    assert_eq!(
        controller.clipboard().contents().as_deref(),
        Some("Answer text.")
    );
    assert_eq!(controller.clipboard().scratch_nodes(), 0);

    let copied = controller.copy_with_sources(&id).unwrap();
    assert_eq!(
        copied,
        "Answer text.\n\
         https://en.wikipedia.org/wiki/Rust_(programming_language)\n\
         https://www.rust-lang.org/\n\
         https://blog.rust-lang.org/2024"
    );
}

#[tokio::test]
async fn test_busy_server_reply_is_rendered() {
    let app_state = state(FakeLlm::replying("unused."));
    let busy = std::sync::Arc::clone(&app_state.busy);
    let base = serve(app_state).await;
    let controller = controller(&base);

    let _held = busy.lock_owned().await;
    let id = ask(&controller, "rust").await;
    assert!(controller.dom().answer_text(&id).is_err());
    let messages = controller.dom().messages();
    assert!(messages[1].message.body.contains("I can only handle one request at a time"));
}

#[tokio::test]
async fn test_unreachable_server_keeps_loader() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
    drop(listener);
    let controller = controller(&base);

    controller.dom().type_text("rust");
    let outcome = controller.send().await.unwrap();
    assert!(matches!(
        outcome,
        SendOutcome::Submitted(SubmitOutcome::Failed(_))
    ));
    assert_eq!(controller.dom().indicator(), Indicator::Loading);
    assert_eq!(controller.dom().messages().len(), 1);
    assert!(!controller.is_in_flight());
}

#[test]
fn test_client_targets_search_path() {
    let client = HttpSearchClient::new(&Url::parse("http://127.0.0.1:5000").unwrap()).unwrap();
    assert_eq!(client.endpoint().path(), SEARCH_PATH);
}
