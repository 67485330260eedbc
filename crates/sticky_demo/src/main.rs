use anyhow::{Context as _, Error};
use log::{debug, error, info};
use std::env;
use std::fs;
use std::process;
use sticky_html::Document;
use sticky_observer::{NodeKey, Rect, StickyHost as _, StickyObserver, StickyObserverOptions};

const VIEWPORT_WIDTH: f64 = 800.0;
const VIEWPORT_HEIGHT: f64 = 600.0;
const SECTION_HEIGHT: f64 = 900.0;
const HEADER_HEIGHT: f64 = 48.0;
const SCROLL_STEP: f64 = 120.0;

pub fn main() {
    env_logger::init();

    if let Err(err) = run() {
        error!("sticky_demo failed: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let options = load_options()?;
    info!("Options: {options:?}");

    let mut doc = build_page()?;
    let mut observer = StickyObserver::observe(&mut doc, ".sticky-header", options);
    info!("Observing {} sticky headers", observer.subjects().len());

    let labels: Vec<(NodeKey, String)> = observer
        .subjects()
        .iter()
        .map(|subject| (*subject, doc.text_content(*subject)))
        .collect();
    observer.on_sticky_change(move |change| {
        let label = labels
            .iter()
            .find(|(subject, _)| *subject == change.target)
            .map_or("?", |(_, label)| label.as_str());
        info!(
            "sticky-change: {label} ({}) is now {}",
            change.target,
            if change.stuck { "stuck" } else { "unstuck" }
        );
    });

    let page_end = SECTION_HEIGHT * 3.0;
    let mut transitions = 0;
    let mut scroll_y = 0.0;
    while scroll_y <= page_end {
        doc.scroll_viewport_to(scroll_y);
        transitions += observer.process(&mut doc);
        scroll_y += SCROLL_STEP;
    }
    while scroll_y >= 0.0 {
        doc.scroll_viewport_to(scroll_y);
        transitions += observer.process(&mut doc);
        scroll_y -= SCROLL_STEP;
    }

    observer.disconnect();
    info!("Done: {transitions} transitions");
    debug!("{doc:?}");
    Ok(())
}

/// Options from the JSON file named by the first argument, then the environment.
fn load_options() -> Result<StickyObserverOptions, Error> {
    let Some(path) = env::args().nth(1) else {
        return Ok(StickyObserverOptions::from_env());
    };
    let json =
        fs::read_to_string(&path).with_context(|| format!("reading options file {path}"))?;
    Ok(StickyObserverOptions::from_json(&json)?.overlay_env())
}

/// Three sections, each with a sticky header, one after another.
fn build_page() -> Result<Document, Error> {
    let mut doc = Document::new();
    doc.set_viewport(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
    let body = doc.append_element(NodeKey::ROOT, "body")?;
    let page_height = SECTION_HEIGHT * 3.0 + VIEWPORT_HEIGHT;
    doc.set_layout(body, Rect::new(0.0, 0.0, VIEWPORT_WIDTH, page_height));
    for (index, title) in ["Introduction", "Details", "Summary"].into_iter().enumerate() {
        let top = SECTION_HEIGHT * index as f64;
        let section = doc.append_element(body, "section")?;
        doc.set_layout(section, Rect::new(0.0, top, VIEWPORT_WIDTH, SECTION_HEIGHT));
        let header = doc.append_element(section, "h2")?;
        doc.add_class(header, "sticky-header")?;
        doc.set_style(header, "position", "sticky")?;
        doc.set_style(header, "top", "0")?;
        doc.set_text_content(header, title)?;
        doc.set_layout(header, Rect::new(0.0, top, VIEWPORT_WIDTH, HEADER_HEIGHT));
    }
    Ok(doc)
}
