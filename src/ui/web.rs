//! Browser binding for the chat controller.
//!
//! [`start`] resolves every page element once, registers the event listeners
//! and returns a [`ChatApp`] handle. Dropping the handle (or calling
//! `teardown()` from JavaScript) removes all listeners again.
//!
//! ```js
//! import init, { start } from "/static/pkg/laiser.js";
//! await init();
//! window.laiser = start();
//! ```

use std::rc::Rc;

use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlDocument, HtmlElement, HtmlFormElement,
    HtmlTextAreaElement, KeyboardEvent, Window, console,
};

use crate::contract::{ANSWER_ID, SOURCES_CLASS, page};

use super::client::HttpSearchClient;
use super::controller::{ChatController, KeyAction, SendOutcome, SubmitOutcome};
use super::dom::{ChatDom, Clipboard, Display, Indicator, MessageControl, UiError};
use super::message::{Direction, Message};

type WebController = ChatController<WebDom, LegacyClipboard, HttpSearchClient>;

fn dom_error(context: &str, err: &JsValue) -> UiError {
    UiError::MissingElement(format!("{context}: {err:?}"))
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, UiError> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
        .ok_or_else(|| UiError::MissingElement(format!("#{id}")))
}

fn by_class<T: JsCast>(document: &Document, class: &str) -> Result<T, UiError> {
    document
        .query_selector(&format!(".{class}"))
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<T>().ok())
        .ok_or_else(|| UiError::MissingElement(format!(".{class}")))
}

fn set_style(el: &HtmlElement, property: &str, value: &str) -> Result<(), UiError> {
    el.style()
        .set_property(property, value)
        .map_err(|e| dom_error(property, &e))
}

/// [`ChatDom`] over the live document.
#[derive(Debug)]
pub struct WebDom {
    window: Window,
    document: Document,
    chat_pane: HtmlElement,
    form: HtmlFormElement,
    input: HtmlTextAreaElement,
    loader: Vec<HtmlElement>,
    send_icon: HtmlElement,
    send_button: HtmlElement,
}

impl WebDom {
    /// Look up every element the controller binds to.
    pub fn resolve(window: Window) -> Result<Self, UiError> {
        let document = window
            .document()
            .ok_or_else(|| UiError::MissingElement("document".to_string()))?;
        let loader = [page::LOADER, page::PUPIL]
            .into_iter()
            .map(|class| by_class::<HtmlElement>(&document, class))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            chat_pane: by_id(&document, page::CHAT_PANE)?,
            form: by_id(&document, page::FORM)?,
            input: by_id(&document, page::INPUT)?,
            send_icon: by_class(&document, page::SEND_ICON)?,
            send_button: by_class(&document, page::SEND_BUTTON)?,
            loader,
            document,
            window,
        })
    }

    fn message(&self, id: &str) -> Result<Element, UiError> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| UiError::MissingMessage {
                id: id.to_string(),
                part: "message",
            })
    }

    fn message_part(
        &self,
        id: &str,
        selector: &str,
        part: &'static str,
    ) -> Result<HtmlElement, UiError> {
        self.message(id)?
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| UiError::MissingMessage {
                id: id.to_string(),
                part,
            })
    }

    fn sources_list(&self, id: &str) -> Result<HtmlElement, UiError> {
        self.message_part(id, &format!(".{SOURCES_CLASS}"), "sources")
    }
}

impl ChatDom for WebDom {
    fn focus_input(&self) -> Result<(), UiError> {
        self.input.focus().map_err(|e| dom_error("focus", &e))
    }

    fn input_value(&self) -> Result<String, UiError> {
        Ok(self.input.value())
    }

    fn clear_input(&self) -> Result<(), UiError> {
        self.input.set_value("");
        Ok(())
    }

    fn reset_input_height(&self) -> Result<(), UiError> {
        set_style(&self.input, "height", "auto")
    }

    fn input_scroll_height(&self) -> Result<f64, UiError> {
        Ok(f64::from(self.input.scroll_height()))
    }

    fn set_input_height(&self, px: f64) -> Result<(), UiError> {
        set_style(&self.input, "height", &format!("{px}px"))
    }

    fn viewport_width(&self) -> Result<f64, UiError> {
        self.window
            .inner_width()
            .map_err(|e| dom_error("innerWidth", &e))?
            .as_f64()
            .ok_or_else(|| UiError::MissingElement("innerWidth".to_string()))
    }

    fn append_message(&self, message: &Message) -> Result<(), UiError> {
        let node = self
            .document
            .create_element("div")
            .map_err(|e| dom_error("createElement", &e))?;
        node.class_list()
            .add_2("message", message.direction.class())
            .map_err(|e| dom_error("classList", &e))?;
        node.set_id(&message.id);
        match message.direction {
            Direction::Sent => node.set_text_content(Some(&message.body)),
            Direction::Received => node.set_inner_html(&message.body),
        }
        self.chat_pane
            .append_child(&node)
            .map_err(|e| dom_error("appendChild", &e))?;
        Ok(())
    }

    fn append_control(&self, message_id: &str, control: MessageControl) -> Result<(), UiError> {
        let message = self.message(message_id)?;
        let button = self
            .document
            .create_element("button")
            .map_err(|e| dom_error("createElement", &e))?;
        button.set_class_name(control.class());
        button
            .set_attribute("type", "button")
            .and_then(|()| button.set_attribute("data-action", control.action()))
            .map_err(|e| dom_error("setAttribute", &e))?;
        button.set_inner_html(&format!("<small>{}</small>", control.label()));
        message
            .append_child(&button)
            .map_err(|e| dom_error("appendChild", &e))?;
        Ok(())
    }

    fn scroll_to_bottom(&self) -> Result<(), UiError> {
        self.chat_pane.set_scroll_top(self.chat_pane.scroll_height());
        Ok(())
    }

    fn set_indicator(&self, indicator: Indicator) -> Result<(), UiError> {
        let (loader, icon) = match indicator {
            Indicator::Idle => ("none", "block"),
            Indicator::Loading => ("block", "none"),
        };
        for el in &self.loader {
            set_style(el, "display", loader)?;
        }
        set_style(&self.send_icon, "display", icon)
    }

    fn sources_display(&self, message_id: &str) -> Result<Display, UiError> {
        let list = self.sources_list(message_id)?;
        let value = list
            .style()
            .get_property_value("display")
            .map_err(|e| dom_error("display", &e))?;
        Ok(Display::from_style(&value))
    }

    fn set_sources_display(&self, message_id: &str, display: Display) -> Result<(), UiError> {
        let list = self.sources_list(message_id)?;
        match display {
            Display::Unset => list
                .style()
                .remove_property("display")
                .map(|_| ())
                .map_err(|e| dom_error("display", &e)),
            Display::Block | Display::None => set_style(&list, "display", display.as_style()),
        }
    }

    fn answer_text(&self, message_id: &str) -> Result<String, UiError> {
        Ok(self
            .message_part(message_id, &format!("#{ANSWER_ID}"), "answer")?
            .inner_text())
    }

    fn sources_text(&self, message_id: &str) -> Result<String, UiError> {
        Ok(self.sources_list(message_id)?.inner_text())
    }
}

/// Clipboard through `document.execCommand('copy')` on a scratch textarea.
#[derive(Debug)]
pub struct LegacyClipboard {
    document: HtmlDocument,
}

impl LegacyClipboard {
    /// Clipboard bound to the page's document.
    pub fn new(document: &Document) -> Result<Self, UiError> {
        let document = document
            .clone()
            .dyn_into::<HtmlDocument>()
            .map_err(|_| UiError::Clipboard("not an HTML document".to_string()))?;
        Ok(Self { document })
    }

    /// Select `text` in an off-screen textarea and run `copy` while it is
    /// attached. The textarea is detached again whatever `copy` returns.
    fn with_scratch_area<T>(
        &self,
        text: &str,
        copy: impl FnOnce(&HtmlTextAreaElement) -> Result<T, UiError>,
    ) -> Result<T, UiError> {
        let body = self
            .document
            .body()
            .ok_or_else(|| UiError::Clipboard("document has no body".to_string()))?;
        let node = self
            .document
            .create_element("textarea")
            .map_err(clipboard_error)?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_| UiError::Clipboard("textarea cast failed".to_string()))?;
        node.set_value(text);
        node.set_attribute("readonly", "").map_err(clipboard_error)?;
        set_style(&node, "position", "fixed")?;
        set_style(&node, "left", "-9999px")?;

        body.append_child(&node).map_err(clipboard_error)?;
        let scratch = ScratchArea { node, body };

        scratch.node.select();
        scratch
            .node
            .set_selection_range(0, u32::MAX)
            .map_err(clipboard_error)?;
        copy(&scratch.node)
    }
}

fn clipboard_error(err: JsValue) -> UiError {
    UiError::Clipboard(format!("{err:?}"))
}

/// Off-screen textarea, detached from the body on drop.
struct ScratchArea {
    node: HtmlTextAreaElement,
    body: HtmlElement,
}

impl Drop for ScratchArea {
    fn drop(&mut self) {
        let _ = self.body.remove_child(&self.node);
    }
}

impl Clipboard for LegacyClipboard {
    fn write_text(&self, text: &str) -> Result<(), UiError> {
        self.with_scratch_area(text, |_selected| {
            if self.document.exec_command("copy").map_err(clipboard_error)? {
                Ok(())
            } else {
                Err(UiError::Clipboard("copy command rejected".to_string()))
            }
        })
    }
}

/// A registered event listener, removed on drop.
#[derive(Debug)]
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        callback: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// Handle to a running chat page.
#[wasm_bindgen]
#[derive(Debug)]
pub struct ChatApp {
    listeners: Vec<Listener>,
    controller: Rc<WebController>,
}

#[wasm_bindgen]
impl ChatApp {
    /// Remove every listener registered by [`start`].
    pub fn teardown(self) {
        drop(self);
    }

    /// Whether a search request is pending.
    #[wasm_bindgen(js_name = isBusy)]
    pub fn is_busy(&self) -> bool {
        self.controller.is_in_flight()
    }
}

fn report(result: Result<(), UiError>) {
    if let Err(err) = result {
        console::error_1(&JsValue::from_str(&format!("Error: {err}")));
    }
}

fn spawn_send(controller: &Rc<WebController>) {
    let controller = Rc::clone(controller);
    wasm_bindgen_futures::spawn_local(async move {
        match controller.send().await {
            Ok(SendOutcome::Submitted(SubmitOutcome::Failed(err))) | Err(err) => report(Err(err)),
            Ok(_) => {}
        }
    });
}

/// Bind the chat controller to the current page.
#[wasm_bindgen]
pub fn start() -> Result<ChatApp, JsValue> {
    let to_js = |e: UiError| JsValue::from_str(&e.to_string());

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let origin = window.location().origin()?;
    let base = Url::parse(&origin).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let dom = WebDom::resolve(window).map_err(to_js)?;
    let clipboard = LegacyClipboard::new(&dom.document).map_err(to_js)?;
    let search = HttpSearchClient::new(&base).map_err(to_js)?;
    let controller = Rc::new(ChatController::new(dom, clipboard, search));

    report(controller.on_load());

    let dom = controller.dom();
    let input: &EventTarget = dom.input.as_ref();
    let send_button: &EventTarget = dom.send_button.as_ref();
    let form: &EventTarget = dom.form.as_ref();
    let chat_pane: &EventTarget = dom.chat_pane.as_ref();

    let mut listeners = Vec::with_capacity(5);

    let c = Rc::clone(&controller);
    listeners.push(Listener::attach(input, "input", move |_| {
        report(c.auto_expand().map(|_| ()));
    })?);

    let c = Rc::clone(&controller);
    listeners.push(Listener::attach(input, "keydown", move |event: Event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if c.on_keydown(&key.key(), key.shift_key()) == KeyAction::Send {
            event.prevent_default();
            spawn_send(&c);
        }
    })?);

    let c = Rc::clone(&controller);
    listeners.push(Listener::attach(send_button, "click", move |_| {
        spawn_send(&c);
    })?);

    let c = Rc::clone(&controller);
    listeners.push(Listener::attach(form, "submit", move |event: Event| {
        event.prevent_default();
        spawn_send(&c);
    })?);

    let c = Rc::clone(&controller);
    listeners.push(Listener::attach(chat_pane, "click", move |event: Event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(Some(button)) = target.closest("button[data-action]") else {
            return;
        };
        let Some(control) = button
            .get_attribute("data-action")
            .as_deref()
            .and_then(MessageControl::from_action)
        else {
            return;
        };
        let Ok(Some(message)) = button.closest(".message") else {
            return;
        };
        report(c.activate(control, &message.id()));
    })?);

    Ok(ChatApp {
        listeners,
        controller,
    })
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

    use super::*;
    use crate::ui::memory::MemoryClipboard;

    wasm_bindgen_test_configure!(run_in_browser);

    const PAGE: &str = r#"<main class="chat">
    <div id="chat-messages" class="chat-messages"></div>
    <form id="user-input" class="user-input">
        <textarea id="input_text" name="input_text" rows="1"></textarea>
        <button type="button" class="send-button">
            <span class="send-icon">&#10148;</span>
            <span class="loader"><span class="pupil"></span></span>
        </button>
    </form>
</main>"#;

    const RESULT: &str = "<div id='answer-response'>Rust is a language.</div>\n\
        <ul id='sources' class='sources'>\n \
        <li class='source-item'><a href='https://a.example' class='source-link'>https://a.example</a></li>\n </ul>";

    fn window() -> Window {
        web_sys::window().unwrap()
    }

    fn mount_page() -> Document {
        let document = window().document().unwrap();
        document.body().unwrap().set_inner_html(PAGE);
        document
    }

    fn scratch_areas(document: &Document) -> u32 {
        document
            .query_selector_all("body > textarea")
            .unwrap()
            .length()
    }

    #[wasm_bindgen_test]
    fn test_scratch_area_is_removed_after_copy() {
        let document = mount_page();
        let clipboard = LegacyClipboard::new(&document).unwrap();

        // Headless browsers may refuse the copy command; the node goes either way.
        let _ = clipboard.write_text("copied text");
        assert_eq!(scratch_areas(&document), 0);

        let copied = clipboard.with_scratch_area("copied text", |node| {
            assert_eq!(node.value(), "copied text");
            assert_eq!(scratch_areas(&document), 1);
            Ok(())
        });
        assert!(copied.is_ok());
        assert_eq!(scratch_areas(&document), 0);

        let rejected: Result<(), UiError> = clipboard.with_scratch_area("copied text", |_| {
            assert_eq!(scratch_areas(&document), 1);
            Err(UiError::Clipboard("copy command rejected".to_string()))
        });
        assert!(matches!(rejected, Err(UiError::Clipboard(_))));
        assert_eq!(scratch_areas(&document), 0);
    }

    #[wasm_bindgen_test]
    fn test_toggle_and_copy_on_page() {
        mount_page();
        let dom = WebDom::resolve(window()).unwrap();
        let base = Url::parse("http://127.0.0.1/").unwrap();
        let controller = ChatController::new(
            dom,
            MemoryClipboard::default(),
            HttpSearchClient::new(&base).unwrap(),
        );

        let dom = controller.dom();
        dom.append_message(&Message::received("m1", RESULT)).unwrap();
        for control in MessageControl::ALL {
            dom.append_control("m1", control).unwrap();
        }

        assert_eq!(dom.sources_display("m1").unwrap(), Display::Unset);
        assert_eq!(controller.toggle_sources("m1").unwrap(), Display::Block);
        assert_eq!(dom.sources_display("m1").unwrap(), Display::Block);
        assert_eq!(controller.toggle_sources("m1").unwrap(), Display::None);

        assert_eq!(controller.copy_answer("m1").unwrap(), "Rust is a language.");
        assert_eq!(
            controller.clipboard().contents().as_deref(),
            Some("Rust is a language.")
        );
        assert!(matches!(
            controller.toggle_sources("missing"),
            Err(UiError::MissingMessage { .. })
        ));
    }

    #[wasm_bindgen_test]
    fn test_teardown_removes_listeners() {
        let document = mount_page();
        let input: HtmlTextAreaElement = by_id(&document, page::INPUT).unwrap();
        let height = || input.style().get_property_value("height").unwrap();
        let app = start().unwrap();

        input.dispatch_event(&Event::new("input").unwrap()).unwrap();
        assert!(height().ends_with("px"));

        app.teardown();
        input.style().remove_property("height").unwrap();
        input.dispatch_event(&Event::new("input").unwrap()).unwrap();
        assert_eq!(height(), "");
    }
}
