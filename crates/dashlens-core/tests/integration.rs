//! Integration tests for dashlens-core.
//!
//! These drive the full pipeline through a `MemorySurface`:
//! host markup → dashboard builders → page events → virtual clock.

use dashlens_core::engagement::{OVERLAY_ID, VISIBLE_CLASS};
use dashlens_core::progress::fill_id;
use dashlens_core::{
    Dashboard, EngagementState, EngagementTracker, EngineConfig, HeatmapOptions, MemorySurface,
    MetricCard, Moment, Node, PageEvent, PageSpec, ProgressOptions, ProgressState, Reaction, Rgb,
    Surface, Viewport, generate, hex_to_rgb, interpolate, rgb_to_hex,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn page_with_buttons(n: usize) -> MemorySurface {
    let buttons = (0..n).map(|i| {
        Node::new("button")
            .id(format!("btn-{i}"))
            .class("interactive")
    });
    MemorySurface::with_markup(buttons.collect())
}

fn scroll_to(percent: f64) -> PageEvent {
    PageEvent::Scroll {
        viewport: Viewport::new(percent * 20.0, 2800.0, 800.0),
    }
}

fn moments(reactions: &[Reaction]) -> usize {
    reactions
        .iter()
        .filter(|r| matches!(r, Reaction::MomentFired { .. }))
        .count()
}

// ---------------------------------------------------------------------------
// Color engine
// ---------------------------------------------------------------------------

#[test]
fn interpolation_hits_endpoint_stops() {
    let data = [3.0, 9.5, -2.0, 14.0, 6.0];
    let stops = ["#f7fbff", "#6baed6", "#08306b"];
    assert_eq!(interpolate(-2.0, &data, &stops).unwrap(), "#f7fbff");
    assert_eq!(interpolate(14.0, &data, &stops).unwrap(), "#08306b");
}

#[test]
fn hex_round_trips_across_the_cube() {
    for r in (0..=255).step_by(17) {
        for g in (0..=255).step_by(51) {
            for b in [0u8, 1, 128, 254, 255] {
                let (r, g) = (r as u8, g as u8);
                assert_eq!(hex_to_rgb(&rgb_to_hex(r, g, b)).unwrap(), Rgb::new(r, g, b));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[test]
fn percentage_is_always_clamped() {
    for (value, max) in [(-50.0, 10.0), (0.0, 10.0), (5.0, 10.0), (1e9, 10.0), (11.0, 10.0)] {
        let p = ProgressState::new(value, max).unwrap().percentage;
        assert!((0.0..=100.0).contains(&p), "{value}/{max} gave {p}");
    }
}

#[test]
fn progress_bar_animates_to_21_percent() {
    let surface = MemorySurface::with_markup(vec![Node::new("div").id("c1")]);
    let mut d = Dashboard::new(surface, EngineConfig::default());
    let bar = d
        .create_progress_bar("c1", 42.0, 200.0, &ProgressOptions::default())
        .unwrap();
    assert_eq!(bar.state.percentage, 21.0);

    let fill = fill_id("c1");
    let s = d.surface_mut();
    assert_eq!(s.style_of(&fill, "width").as_deref(), Some("0%"));
    assert_eq!(
        s.style_of(&fill, "transition").as_deref(),
        Some("width 1000ms ease-out")
    );

    s.advance(49);
    assert_eq!(s.style_of(&fill, "width").as_deref(), Some("0%"));
    s.advance(1);
    assert_eq!(s.style_of(&fill, "width").as_deref(), Some("21%"));
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

#[test]
fn constant_matrix_renders_first_stop_everywhere() {
    let surface = MemorySurface::with_markup(vec![Node::new("div").id("hm")]);
    let mut d = Dashboard::new(surface, EngineConfig::default());
    let options = HeatmapOptions {
        color_scale: Some(vec!["#fee0d2".into(), "#de2d26".into()]),
        ..HeatmapOptions::default()
    };
    let grid = d
        .create_heatmap(
            "hm",
            vec![vec![7.0; 3]; 3],
            vec!["a".into(), "b".into(), "c".into()],
            vec!["x".into(), "y".into(), "z".into()],
            &options,
        )
        .unwrap();
    assert!(grid.cells.iter().flatten().all(|c| c.fill == "#fee0d2"));

    let s = d.surface();
    let cells = s.query_class("hm", "heatmap-cell");
    assert_eq!(cells.len(), 9);
    for id in cells {
        assert_eq!(s.style_of(&id, "background-color").as_deref(), Some("#fee0d2"));
    }
}

// ---------------------------------------------------------------------------
// Narrative
// ---------------------------------------------------------------------------

#[test]
fn accuracy_card_story() {
    let n = generate(&MetricCard::new("Accuracy", "96%"));
    assert!(n.story.contains("nearly all"));
    assert!(
        n.metrics
            .iter()
            .any(|m| m.value == "4%" && m.label == "Time Saved")
    );
}

#[test]
fn metric_card_reveals_once_through_events() {
    let surface = MemorySurface::with_markup(vec![Node::new("div").id("card")]);
    let mut d = Dashboard::new(surface, EngineConfig::default());
    d.personalize_card("card", &MetricCard::new("Response Time", "0.8s"))
        .unwrap();
    let visible = |ratio| PageEvent::Visibility {
        element: "card".into(),
        ratio,
    };
    assert!(d.handle(visible(0.1)).is_empty());
    assert_eq!(
        d.handle(visible(0.5)),
        vec![Reaction::CardRevealed {
            card: "card".into()
        }]
    );
    assert!(d.handle(visible(1.0)).is_empty());
}

// ---------------------------------------------------------------------------
// Engagement
// ---------------------------------------------------------------------------

#[test]
fn crossing_80_three_times_fires_once() {
    let mut d = Dashboard::new(page_with_buttons(0), EngineConfig::default());
    let mut fired = 0;
    for p in [40.0, 85.0, 60.0, 90.0, 10.0, 95.0] {
        fired += moments(&d.handle(scroll_to(p)));
    }
    assert_eq!(fired, 1);
    assert!(d.engagement_state().scroll_moment_fired);
    assert!((d.engagement_state().max_scroll_depth_percent - 95.0).abs() < 1e-9);
}

#[test]
fn exploration_fires_on_exact_fifth_click() {
    let mut d = Dashboard::new(page_with_buttons(6), EngineConfig::default());
    for i in 0..4 {
        let r = d.handle(PageEvent::Click {
            element: format!("btn-{i}"),
        });
        assert_eq!(moments(&r), 0, "click {i} fired early");
    }
    let r = d.handle(PageEvent::Click {
        element: "btn-4".into(),
    });
    assert_eq!(
        r,
        vec![Reaction::MomentFired {
            moment: Moment::Exploration,
            anchor: "btn-4".into()
        }]
    );
    let r = d.handle(PageEvent::Click {
        element: "btn-5".into(),
    });
    assert_eq!(moments(&r), 0);
}

#[test]
fn offset_start_never_fires() {
    let mut surface = page_with_buttons(1);
    let state = EngagementState {
        interaction_count: 6,
        ..EngagementState::default()
    };
    let mut tracker = EngagementTracker::with_state(EngineConfig::default().engagement, state);
    let mut rng = SmallRng::seed_from_u64(1);
    for _ in 0..50 {
        assert!(tracker.on_interaction(&mut surface, "btn-0", &mut rng).is_none());
    }
    assert!(!tracker.state().exploration_moment_fired);
}

#[test]
fn overlay_hides_after_4000ms_and_is_reused() {
    let mut d = Dashboard::new(page_with_buttons(5), EngineConfig::default());
    d.handle(scroll_to(99.0));
    assert!(d.surface().has_class(OVERLAY_ID, VISIBLE_CLASS));

    d.handle(PageEvent::Advance { ms: 3999 });
    assert!(d.surface().has_class(OVERLAY_ID, VISIBLE_CLASS));
    d.handle(PageEvent::Advance { ms: 1 });
    assert!(!d.surface().has_class(OVERLAY_ID, VISIBLE_CLASS));

    // The other trigger still fires and reuses the same overlay node.
    for i in 0..5 {
        d.handle(PageEvent::Click {
            element: format!("btn-{i}"),
        });
    }
    assert!(d.surface().has_class(OVERLAY_ID, VISIBLE_CLASS));
    let html = d.surface().document_html();
    assert_eq!(html.matches("id=\"success-moment\"").count(), 1);
}

#[test]
fn manual_moment_uses_the_same_overlay() {
    let mut d = Dashboard::new(page_with_buttons(1), EngineConfig::default());
    assert!(d.create_success_moment("btn-0", "Saved!"));
    assert!(!d.create_success_moment("missing", "nope"));
    assert!(d.surface().text_content(OVERLAY_ID).unwrap().contains("Saved!"));
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

#[test]
fn page_spec_renders_and_settles_to_static_html() {
    let page = PageSpec::from_json_str(
        r#"{"widgets":[{"widget":"progress","target":"p","value":3,"max_value":4}]}"#,
    )
    .unwrap();
    let mut d = Dashboard::new(MemorySurface::new(), EngineConfig::default());
    d.render_page(&page).unwrap();
    d.surface_mut().settle();
    let html = d.surface().document_html();
    assert!(html.contains("width: 75%"));
    assert!(html.contains("75%</span>"));
}
