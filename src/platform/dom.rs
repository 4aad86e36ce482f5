//! DOM-backed view
//!
//! Writes HUD values into the page's elements by id and draws the price
//! chart on the `bitcoinChart` canvas. Missing elements are skipped so a
//! stripped-down page still runs.

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, Window};

use crate::hud::Hud;
use crate::renderer::{CanvasPainter, draw_price_chart};
use crate::sim::{CountdownStep, GamePhase, PriceHistory, SessionSummary};

const HIDDEN: &str = "hidden";
const COUNTDOWN_OVERLAY_ID: &str = "countdownOverlay";

pub struct DomHud {
    window: Window,
    document: Document,
    /// `.game-container`, target of the shake transform
    container: Option<HtmlElement>,
    chart: Option<CanvasPainter>,
}

impl DomHud {
    pub fn new(window: Window) -> Result<Self, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let container = document
            .query_selector(".game-container")?
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());

        let chart = match document.get_element_by_id("bitcoinChart") {
            Some(el) => Some(CanvasPainter::new(el.dyn_into::<HtmlCanvasElement>()?)?),
            None => {
                log::warn!("No #bitcoinChart canvas; price chart disabled");
                None
            }
        };

        Ok(Self {
            window,
            document,
            container,
            chart,
        })
    }

    fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.element(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(&self, id: &str, hidden: bool) {
        let Some(el) = self.element(id) else {
            return;
        };
        let classes = el.class_list();
        if hidden {
            classes.add_1(HIDDEN).ok();
        } else {
            classes.remove_1(HIDDEN).ok();
        }
    }

    fn countdown_overlay(&self) -> Result<Element, JsValue> {
        if let Some(overlay) = self.element(COUNTDOWN_OVERLAY_ID) {
            return Ok(overlay);
        }
        let overlay = self.document.create_element("div")?;
        overlay.set_class_name("overlay");
        overlay.set_id(COUNTDOWN_OVERLAY_ID);
        if let Some(container) = &self.container {
            container.append_child(&overlay)?;
        } else if let Some(body) = self.document.body() {
            body.append_child(&overlay)?;
        }
        Ok(overlay)
    }
}

impl Hud for DomHud {
    fn show_phase(&mut self, phase: GamePhase) {
        self.set_hidden("startScreen", phase != GamePhase::Idle);
        self.set_hidden("endScreen", phase != GamePhase::Ended);
        self.set_hidden("stopButton", phase != GamePhase::Running);
    }

    fn show_countdown(&mut self, step: Option<CountdownStep>) {
        let Some(step) = step else {
            if let Some(overlay) = self.element(COUNTDOWN_OVERLAY_ID) {
                overlay.remove();
            }
            return;
        };
        match self.countdown_overlay() {
            Ok(overlay) => {
                overlay.set_inner_html(&format!(r#"<div class="countdown">{}</div>"#, step.label()))
            }
            Err(e) => log::warn!("Countdown overlay unavailable: {:?}", e),
        }
    }

    fn show_score(&mut self, score: u64) {
        self.set_text("score", &score.to_string());
    }

    fn show_time(&mut self, seconds: u32) {
        self.set_text("timer", &seconds.to_string());
    }

    fn show_price(&mut self, value: f32, history: &PriceHistory) {
        self.set_text("bitcoinValue", &format!("{}", value.round()));
        if let Some(chart) = &mut self.chart {
            let (w, h) = chart.size();
            chart.clear();
            draw_price_chart(history, chart, w, h);
        }
    }

    fn show_summary(&mut self, summary: &SessionSummary) {
        self.set_text("finalScore", &summary.score.to_string());
        self.set_text("finalDollars", &summary.dollars.to_string());
        self.set_text("dollarPoints", &summary.dollar_points.to_string());
        self.set_text("finalBitcoins", &summary.bitcoin_count.to_string());
        self.set_text("bitcoinPoints", &summary.bitcoin_points.to_string());
    }

    fn show_muted(&mut self, muted: bool) {
        if let Some(button) = self.element("muteButton") {
            button.class_list().toggle_with_force("muted", muted).ok();
        }
    }

    fn shake(&mut self, offset: Vec2) {
        if let Some(container) = &self.container {
            let transform = format!("translate({}px, {}px)", offset.x, offset.y);
            container.style().set_property("transform", &transform).ok();
        }
    }

    fn vibrate(&mut self, millis: u32) {
        self.window.navigator().vibrate_with_duration(millis);
    }
}
