//! Todo list example - building a small widget and driving it with events

use elemental::{attrs, children, BuilderConfig, Builder, Child, Events, Tags};
use elemental_dom::{Document, Event, HtmlSerializer};
use std::cell::RefCell;
use std::rc::Rc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = BuilderConfig::from_json(r#"{"defer_after": true}"#)?;
    let tags = Tags::with_builder(Builder::with_config(config));
    let mut doc = Document::new();

    // One <li> per item, each with a remove button bound via sub_events
    let done = Rc::new(RefCell::new(Vec::new()));
    let mut items = Vec::new();
    for (index, label) in ["write docs", "review parser", "ship"].iter().enumerate() {
        let log = Rc::clone(&done);
        let item = tags.li(
            &mut doc,
            (
                attrs! { "data-index" => index },
                children![*label, " <button class=\"done\">done</button>"],
                Events::new().sub("button.done", "click", move |_, event| {
                    log.borrow_mut().push(index);
                    event.stop_propagation();
                }),
            ),
        )?;
        items.push(Child::from(item));
    }

    let clicks = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&clicks);
    let list = tags
        .ul(
            &mut doc,
            (
                attrs! { "class" => "todo" },
                items,
                Events::new()
                    .on("click", move |_, _| *counter.borrow_mut() += 1)
                    .after(|doc, node| {
                        println!("Built list with {} items", doc.children(node).map_or(0, |c| c.len()));
                    }),
            ),
        )?
        .node()
        .ok_or("list was not built")?;

    // Click every "done" button; the list never sees them
    for button in doc.query_selector_all(list, "button.done")? {
        doc.dispatch_event(button, Event::new("click"))?;
    }
    // A click on the list itself
    doc.dispatch_event(list, Event::new("click"))?;

    println!("{}", HtmlSerializer::pretty().outer_html(doc.arena(), list)?);
    println!("Done: {:?}", done.borrow());
    println!("List clicks: {}", clicks.borrow());
    println!("{}", serde_json::to_string_pretty(&doc.snapshot_json(list)?)?);

    Ok(())
}
