//! Example: shared-element page transition
//!
//! A thumbnail on the list page grows into the hero image of the detail
//! page. Frames are pumped on the fallback timer and the page runner is
//! awaited with smol.
//!
//! Run with `RUST_LOG=fos_animate=debug` to follow driver selection.

use std::rc::Rc;

use anyhow::Context;
use fos_animate::{AnimateConfig, AnimateContext, AnimationEvent, AnimationOptions, AnimationQueue, FrameLoop};
use fos_dom::{AnimationEndEvent, Document, Rect, TimingRule};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AnimateConfig::default();
    let frames = Rc::new(FrameLoop::detect(&config, false));
    let doc = Document::new();
    doc.add_timing_rule(TimingRule::new(".fos-anchor-out-add").transition(0.15, 0.0));
    doc.add_timing_rule(TimingRule::new(".fos-anchor-in-add").transition(0.25, 0.0));

    let ctx = AnimateContext::new(config, doc.clone(), frames.clone()).context("invalid animation config")?;
    let queue = AnimationQueue::new(ctx);

    let list_page = doc.create_element("section");
    let detail_page = doc.create_element("section");
    list_page.set_class_attribute("page list");
    detail_page.set_class_attribute("page detail");
    doc.body().append_child(&list_page)?;
    doc.body().append_child(&detail_page)?;

    let thumb = doc.create_element("img");
    let hero = doc.create_element("img");
    thumb.set_class_attribute("thumb");
    hero.set_class_attribute("hero");
    thumb.set_attribute("fos-animate-ref", "photo-42");
    hero.set_attribute("fos-animate-ref", "photo-42");
    thumb.set_bounding_rect(Rect::new(120.0, 16.0, 64.0, 64.0));
    hero.set_bounding_rect(Rect::new(0.0, 0.0, 360.0, 240.0));
    list_page.append_child(&thumb)?;
    detail_page.append_child(&hero)?;

    let leaving = list_page.clone();
    queue.animate(
        &list_page,
        AnimationEvent::Leave,
        AnimationOptions::new().dom_operation(move || leaving.remove()),
    );
    let runner = queue.animate(&detail_page, AnimationEvent::Enter, AnimationOptions::new());
    queue.flush();

    let clone = doc
        .body()
        .children()
        .into_iter()
        .find(|el| el.has_class("fos-anchor"))
        .context("anchor clone was not attached")?;
    println!("clone starts at top={:?} width={:?}", clone.style("top"), clone.style("width"));

    // the host reports transition ends; simulate them as the frames go by
    let mut out_done = false;
    let mut in_done = false;
    while !runner.is_done() {
        frames.tick();
        if !out_done && clone.has_class("fos-anchor-out-add-active") {
            clone.dispatch_animation_end(AnimationEndEvent::transition(0.15));
            out_done = true;
        } else if !in_done && clone.has_class("fos-anchor-in-add-active") {
            println!("clone moving to top={:?} width={:?}", clone.style("top"), clone.style("width"));
            clone.dispatch_animation_end(AnimationEndEvent::transition(0.25));
            in_done = true;
        }
        if frames.frame_count() > 100 {
            anyhow::bail!("transition did not settle");
        }
    }

    let outcome = smol::block_on(async {
        frames.run_until_idle().await;
        runner.future().await
    });
    println!(
        "page transition {} after {} frames; list page attached: {}",
        if outcome.is_ok() { "completed" } else { "cancelled" },
        frames.frame_count(),
        list_page.has_parent()
    );
    Ok(())
}
