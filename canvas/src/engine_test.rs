#![allow(clippy::float_cmp)]

use super::*;
use crate::assets::AssetStore;
use crate::export::{ExportError, ExportOptions, export};
use crate::render::raster::SkiaRasterizer;

// =============================================================
// Helpers
// =============================================================

fn core() -> EngineCore {
    EngineCore::new(400, 300, Color::WHITE).unwrap()
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn ctrl() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

fn ctrl_shift() -> Modifiers {
    Modifiers { ctrl: true, shift: true, ..Default::default() }
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn click(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    let mut actions = core.on_pointer_down(pt(x, y), Button::Primary, no_modifiers());
    actions.extend(core.on_pointer_up(pt(x, y), Button::Primary, no_modifiers()));
    actions
}

fn drag(core: &mut EngineCore, path: &[(f64, f64)]) -> Vec<Action> {
    let (first, rest) = path.split_first().unwrap();
    let mut actions = core.on_pointer_down(pt(first.0, first.1), Button::Primary, no_modifiers());
    for &(x, y) in rest {
        actions.extend(core.on_pointer_move(pt(x, y), no_modifiers()));
    }
    let last = path.last().unwrap();
    actions.extend(core.on_pointer_up(pt(last.0, last.1), Button::Primary, no_modifiers()));
    actions
}

fn insert_rect(core: &mut EngineCore) -> ObjectId {
    core.set_tool(Tool::Rectangle);
    click(core, 0.0, 0.0);
    core.surface.objects().last().unwrap().id
}

fn has_action<F>(actions: &[Action], pred: F) -> bool
where
    F: Fn(&Action) -> bool,
{
    actions.iter().any(pred)
}

fn has_history_changed(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::HistoryChanged { .. }))
}

fn has_object_created(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::ObjectCreated(_)))
}

fn has_render_needed(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::RenderNeeded))
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_core_starts_with_pen_and_one_snapshot() {
    let core = core();
    assert_eq!(core.tool(), Tool::Pen);
    assert!(core.surface.is_empty());
    assert_eq!(core.history.len(), 1);
    assert_eq!(core.history.cursor(), Some(0));
    assert!(!core.can_undo());
    assert!(!core.can_redo());
    assert_eq!(core.selection(), None);
}

#[test]
fn from_surface_snapshots_existing_objects() {
    let mut surface = Surface::new(100, 100, Color::WHITE);
    surface.push(Drawable::new(Shape::Rect {
        x: 0.0,
        y: 0.0,
        width: 10.0,
        height: 10.0,
        stroke: Color::BLACK,
        stroke_width: 1.0,
        fill: Fill::Transparent,
    }));
    let mut core = EngineCore::from_surface(surface).unwrap();
    assert_eq!(core.history.len(), 1);
    assert!(core.undo().unwrap().is_empty());
    assert_eq!(core.surface.len(), 1);
}

// =============================================================
// Pen and eraser
// =============================================================

#[test]
fn pen_drag_commits_one_stroke_and_checkpoints() {
    let mut core = core();
    let actions = drag(&mut core, &[(10.0, 10.0), (20.0, 15.0), (30.0, 20.0)]);
    assert!(has_object_created(&actions));
    assert!(has_history_changed(&actions));
    assert_eq!(core.surface.len(), 1);
    assert_eq!(core.history.len(), 2);
    let Shape::Stroke { points, color, width } = &core.surface.objects()[0].shape else {
        panic!("expected stroke");
    };
    assert_eq!(points.len(), 3);
    assert_eq!(*color, Color::BLACK);
    assert_eq!(*width, 3.0);
}

#[test]
fn pen_points_are_in_surface_space() {
    let mut core = core();
    core.surface.camera.set_zoom(2.0);
    core.surface.camera.pan_by(20.0, 10.0);
    drag(&mut core, &[(20.0, 10.0), (120.0, 110.0)]);
    let Shape::Stroke { points, .. } = &core.surface.objects()[0].shape else {
        panic!("expected stroke");
    };
    assert_eq!(points[0], pt(0.0, 0.0));
    assert_eq!(points[1], pt(50.0, 50.0));
}

#[test]
fn stroke_in_progress_is_not_on_surface() {
    let mut core = core();
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(5.0, 5.0), no_modifiers());
    assert!(core.surface.is_empty());
    let (points, _, _) = core.pending_stroke().unwrap();
    assert_eq!(points.len(), 2);
}

#[test]
fn duplicate_move_points_are_skipped() {
    let mut core = core();
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    assert!(core.on_pointer_move(pt(0.0, 0.0), no_modifiers()).is_empty());
    assert_eq!(core.pending_stroke().unwrap().0.len(), 1);
}

#[test]
fn single_click_with_pen_commits_a_dot() {
    let mut core = core();
    click(&mut core, 40.0, 40.0);
    assert_eq!(core.surface.len(), 1);
}

#[test]
fn brush_settings_apply_to_new_strokes() {
    let mut core = core();
    core.set_brush_color(Color::rgb(10, 20, 30));
    core.set_brush_width(9.0);
    drag(&mut core, &[(0.0, 0.0), (10.0, 10.0)]);
    let Shape::Stroke { color, width, .. } = &core.surface.objects()[0].shape else {
        panic!("expected stroke");
    };
    assert_eq!(*color, Color::rgb(10, 20, 30));
    assert_eq!(*width, 9.0);
}

#[test]
fn invalid_brush_width_is_ignored() {
    let mut core = core();
    core.set_brush_width(0.0);
    core.set_brush_width(f64::NAN);
    assert_eq!(core.brush().width, 3.0);
}

#[test]
fn eraser_paints_background_color() {
    let mut core = EngineCore::new(100, 100, Color::rgb(250, 240, 230)).unwrap();
    core.set_brush_color(Color::rgb(255, 0, 0));
    core.set_tool(Tool::Eraser);
    drag(&mut core, &[(0.0, 0.0), (10.0, 10.0)]);
    let Shape::Stroke { color, .. } = &core.surface.objects()[0].shape else {
        panic!("expected stroke");
    };
    assert_eq!(*color, Color::rgb(250, 240, 230));
}

// =============================================================
// Tool isolation
// =============================================================

#[test]
fn switching_to_select_mid_stroke_commits_it() {
    let mut core = core();
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(10.0, 0.0), no_modifiers());
    let actions = core.set_tool(Tool::Select);
    assert!(has_object_created(&actions));
    assert_eq!(core.surface.len(), 1);
    assert_eq!(core.history.len(), 2);
    assert!(core.pending_stroke().is_none());
}

#[test]
fn select_mode_drag_draws_nothing() {
    let mut core = core();
    core.set_tool(Tool::Select);
    drag(&mut core, &[(0.0, 0.0), (50.0, 50.0), (80.0, 80.0)]);
    assert!(core.surface.is_empty());
    assert_eq!(core.history.len(), 1);
}

#[test]
fn pan_mode_moves_camera_without_checkpoint() {
    let mut core = core();
    core.set_tool(Tool::Pan);
    let actions = drag(&mut core, &[(10.0, 10.0), (40.0, 30.0)]);
    assert_eq!(core.camera().pan_x, 30.0);
    assert_eq!(core.camera().pan_y, 20.0);
    assert!(!has_history_changed(&actions));
    assert_eq!(core.history.len(), 1);
    assert!(has_action(&actions, |a| *a == Action::SetCursor("grab".into())));
}

#[test]
fn pan_mode_does_not_select() {
    let mut core = core();
    insert_rect(&mut core);
    core.set_tool(Tool::Pan);
    click(&mut core, 150.0, 150.0);
    assert_eq!(core.selection(), None);
}

#[test]
fn middle_button_pans_with_any_tool() {
    let mut core = core();
    core.on_pointer_down(pt(0.0, 0.0), Button::Middle, no_modifiers());
    core.on_pointer_move(pt(5.0, 7.0), no_modifiers());
    core.on_pointer_up(pt(5.0, 7.0), Button::Middle, no_modifiers());
    assert_eq!(core.camera().pan_x, 5.0);
    assert!(core.surface.is_empty());
}

#[test]
fn secondary_button_is_ignored() {
    let mut core = core();
    assert!(core.on_pointer_down(pt(0.0, 0.0), Button::Secondary, no_modifiers()).is_empty());
    assert!(matches!(core.input, InputState::Idle));
}

#[test]
fn set_tool_reports_cursor() {
    let mut core = core();
    let actions = core.set_tool(Tool::Text);
    assert!(has_action(&actions, |a| *a == Action::SetCursor("text".into())));
}

// =============================================================
// Shape and text insertion
// =============================================================

#[test]
fn rectangle_click_inserts_default_rect() {
    let mut core = core();
    core.set_brush_color(Color::rgb(0, 0, 255));
    core.set_fill(Fill::Solid(Color::rgb(255, 255, 0)));
    core.set_tool(Tool::Rectangle);
    let actions = click(&mut core, 300.0, 250.0);
    assert!(has_object_created(&actions));
    assert!(has_history_changed(&actions));
    let Shape::Rect { x, y, width, height, stroke, fill, .. } = &core.surface.objects()[0].shape else {
        panic!("expected rect");
    };
    assert_eq!((*x, *y, *width, *height), (100.0, 100.0, 100.0, 100.0));
    assert_eq!(*stroke, Color::rgb(0, 0, 255));
    assert_eq!(*fill, Fill::Solid(Color::rgb(255, 255, 0)));
}

#[test]
fn repeated_rectangle_clicks_stack_shapes() {
    let mut core = core();
    core.set_tool(Tool::Rectangle);
    click(&mut core, 0.0, 0.0);
    click(&mut core, 0.0, 0.0);
    assert_eq!(core.surface.len(), 2);
    assert_eq!(core.surface.objects()[0].shape.bounds(), core.surface.objects()[1].shape.bounds());
    assert_eq!(core.tool(), Tool::Rectangle);
}

#[test]
fn circle_click_inserts_default_circle() {
    let mut core = core();
    core.set_tool(Tool::Circle);
    click(&mut core, 5.0, 5.0);
    let Shape::Circle { cx, cy, radius, fill, .. } = &core.surface.objects()[0].shape else {
        panic!("expected circle");
    };
    assert_eq!((*cx, *cy, *radius), (150.0, 150.0, 50.0));
    assert_eq!(*fill, Fill::Transparent);
}

#[test]
fn text_click_inserts_placeholder_and_starts_edit() {
    let mut core = core();
    core.set_tool(Tool::Text);
    let actions = core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    let id = core.surface.objects()[0].id;
    let Shape::Text { x, y, content, font_size, font_family, .. } = &core.surface.objects()[0].shape else {
        panic!("expected text");
    };
    assert_eq!((*x, *y), (100.0, 100.0));
    assert_eq!(content, "Type here");
    assert_eq!(*font_size, 20.0);
    assert_eq!(font_family, "Arial");
    assert!(has_action(&actions, |a| *a == Action::EditTextRequested { id, content: "Type here".into() }));
    assert_eq!(core.selection(), Some(id));
    assert_eq!(core.editing_text(), Some(id));
    assert_eq!(core.history.len(), 2);
}

#[test]
fn set_text_updates_content_and_checkpoints() {
    let mut core = core();
    core.set_tool(Tool::Text);
    click(&mut core, 0.0, 0.0);
    let id = core.surface.objects()[0].id;
    let actions = core.set_text(&id, "Hem 2cm");
    assert!(has_action(&actions, |a| matches!(a, Action::ObjectUpdated(_))));
    assert_eq!(core.history.len(), 3);
    let Shape::Text { content, .. } = &core.object(&id).unwrap().shape else {
        panic!("expected text");
    };
    assert_eq!(content, "Hem 2cm");

    core.undo().unwrap();
    let Shape::Text { content, .. } = &core.object(&id).unwrap().shape else {
        panic!("expected text");
    };
    assert_eq!(content, "Type here");
}

#[test]
fn set_text_with_same_content_is_noop() {
    let mut core = core();
    core.set_tool(Tool::Text);
    click(&mut core, 0.0, 0.0);
    let id = core.surface.objects()[0].id;
    assert!(core.set_text(&id, "Type here").is_empty());
    assert_eq!(core.history.len(), 2);
}

#[test]
fn set_text_on_non_text_object_is_noop() {
    let mut core = core();
    let id = insert_rect(&mut core);
    assert!(core.set_text(&id, "nope").is_empty());
}

#[test]
fn end_text_edit_keeps_selection() {
    let mut core = core();
    core.set_tool(Tool::Text);
    click(&mut core, 0.0, 0.0);
    let id = core.surface.objects()[0].id;
    assert!(has_render_needed(&core.end_text_edit()));
    assert_eq!(core.editing_text(), None);
    assert_eq!(core.selection(), Some(id));
    assert!(core.end_text_edit().is_empty());
}

// =============================================================
// Select: move and resize
// =============================================================

#[test]
fn click_on_object_selects_it() {
    let mut core = core();
    let id = insert_rect(&mut core);
    core.set_tool(Tool::Select);
    click(&mut core, 150.0, 150.0);
    assert_eq!(core.selection(), Some(id));
}

#[test]
fn click_on_empty_space_deselects() {
    let mut core = core();
    insert_rect(&mut core);
    core.set_tool(Tool::Select);
    click(&mut core, 150.0, 150.0);
    click(&mut core, 10.0, 10.0);
    assert_eq!(core.selection(), None);
}

#[test]
fn topmost_object_is_selected() {
    let mut core = core();
    insert_rect(&mut core);
    let top = insert_rect(&mut core);
    core.set_tool(Tool::Select);
    click(&mut core, 150.0, 150.0);
    assert_eq!(core.selection(), Some(top));
}

#[test]
fn drag_moves_object_and_checkpoints() {
    let mut core = core();
    let id = insert_rect(&mut core);
    core.set_tool(Tool::Select);
    let actions = drag(&mut core, &[(150.0, 150.0), (160.0, 155.0), (170.0, 160.0)]);
    assert!(has_action(&actions, |a| matches!(a, Action::ObjectUpdated(o) if o.id == id)));
    assert_eq!(core.object(&id).unwrap().shape.bounds(), Bounds::new(120.0, 110.0, 100.0, 100.0));
    assert_eq!(core.history.len(), 3);
}

#[test]
fn click_without_movement_does_not_checkpoint() {
    let mut core = core();
    insert_rect(&mut core);
    core.set_tool(Tool::Select);
    let actions = click(&mut core, 150.0, 150.0);
    assert!(!has_history_changed(&actions));
    assert_eq!(core.history.len(), 2);
}

#[test]
fn drag_back_to_start_does_not_checkpoint() {
    let mut core = core();
    insert_rect(&mut core);
    core.set_tool(Tool::Select);
    drag(&mut core, &[(150.0, 150.0), (180.0, 180.0), (150.0, 150.0)]);
    assert_eq!(core.history.len(), 2);
}

#[test]
fn corner_handle_drag_resizes() {
    let mut core = core();
    let id = insert_rect(&mut core);
    core.set_tool(Tool::Select);
    click(&mut core, 150.0, 150.0);
    drag(&mut core, &[(200.0, 200.0), (250.0, 220.0)]);
    assert_eq!(core.object(&id).unwrap().shape.bounds(), Bounds::new(100.0, 100.0, 150.0, 120.0));
    assert_eq!(core.history.len(), 3);
}

#[test]
fn resize_past_opposite_corner_normalizes() {
    let mut core = core();
    let id = insert_rect(&mut core);
    core.set_tool(Tool::Select);
    click(&mut core, 150.0, 150.0);
    drag(&mut core, &[(100.0, 100.0), (250.0, 250.0)]);
    assert_eq!(core.object(&id).unwrap().shape.bounds(), Bounds::new(200.0, 200.0, 50.0, 50.0));
}

#[test]
fn move_is_undoable() {
    let mut core = core();
    let id = insert_rect(&mut core);
    core.set_tool(Tool::Select);
    drag(&mut core, &[(150.0, 150.0), (190.0, 190.0)]);
    core.undo().unwrap();
    assert_eq!(core.object(&id).unwrap().shape.bounds(), Bounds::new(100.0, 100.0, 100.0, 100.0));
}

// =============================================================
// Deletion and clear
// =============================================================

#[test]
fn delete_key_removes_selection() {
    let mut core = core();
    let id = insert_rect(&mut core);
    core.set_tool(Tool::Select);
    click(&mut core, 150.0, 150.0);
    let actions = core.on_key_down(&Key::new("Delete"), no_modifiers());
    assert!(has_action(&actions, |a| *a == Action::ObjectDeleted { id }));
    assert!(core.surface.is_empty());
    assert_eq!(core.selection(), None);
    assert_eq!(core.history.len(), 3);
}

#[test]
fn backspace_also_deletes() {
    let mut core = core();
    insert_rect(&mut core);
    core.set_tool(Tool::Select);
    click(&mut core, 150.0, 150.0);
    core.on_key_down(&Key::new("Backspace"), no_modifiers());
    assert!(core.surface.is_empty());
}

#[test]
fn delete_while_editing_text_is_ignored() {
    let mut core = core();
    core.set_tool(Tool::Text);
    click(&mut core, 0.0, 0.0);
    assert!(core.on_key_down(&Key::new("Backspace"), no_modifiers()).is_empty());
    assert_eq!(core.surface.len(), 1);
}

#[test]
fn delete_without_selection_is_noop() {
    let mut core = core();
    insert_rect(&mut core);
    assert!(core.delete_selected().is_empty());
    assert_eq!(core.surface.len(), 1);
}

#[test]
fn escape_leaves_text_edit_then_deselects() {
    let mut core = core();
    core.set_tool(Tool::Text);
    click(&mut core, 0.0, 0.0);
    core.on_key_down(&Key::new("Escape"), no_modifiers());
    assert_eq!(core.editing_text(), None);
    assert!(core.selection().is_some());
    core.on_key_down(&Key::new("Escape"), no_modifiers());
    assert_eq!(core.selection(), None);
    assert!(core.on_key_down(&Key::new("Escape"), no_modifiers()).is_empty());
}

#[test]
fn clear_all_empties_surface_and_is_undoable() {
    let mut core = core();
    insert_rect(&mut core);
    insert_rect(&mut core);
    let actions = core.clear_all();
    assert!(has_action(&actions, |a| *a == Action::Cleared));
    assert!(core.surface.is_empty());
    core.undo().unwrap();
    assert_eq!(core.surface.len(), 2);
}

#[test]
fn clear_all_on_empty_surface_is_noop() {
    let mut core = core();
    assert!(core.clear_all().is_empty());
    assert_eq!(core.history.len(), 1);
}

// =============================================================
// Undo / redo
// =============================================================

#[test]
fn undo_then_redo_restores_identical_objects() {
    let mut core = core();
    drag(&mut core, &[(1.1, 2.2), (3.3, 4.4), (5.5, 6.6)]);
    insert_rect(&mut core);
    let before = core.surface.objects().to_vec();
    core.undo().unwrap();
    core.redo().unwrap();
    assert_eq!(core.surface.objects(), before.as_slice());
}

#[test]
fn undo_at_start_is_noop() {
    let mut core = core();
    assert!(core.undo().unwrap().is_empty());
    assert_eq!(core.history.cursor(), Some(0));
}

#[test]
fn redo_at_end_is_noop() {
    let mut core = core();
    insert_rect(&mut core);
    assert!(core.redo().unwrap().is_empty());
}

#[test]
fn new_change_after_undo_discards_redo() {
    let mut core = core();
    insert_rect(&mut core);
    insert_rect(&mut core);
    core.undo().unwrap();
    assert!(core.can_redo());
    core.set_tool(Tool::Pen);
    drag(&mut core, &[(0.0, 0.0), (5.0, 5.0)]);
    assert!(!core.can_redo());
    assert_eq!(core.history.len(), 3);
}

#[test]
fn undo_mid_stroke_commits_then_undoes_it() {
    let mut core = core();
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(10.0, 10.0), no_modifiers());
    core.undo().unwrap();
    assert!(core.surface.is_empty());
    assert!(core.can_redo());
    assert!(matches!(core.input, InputState::Idle));
}

#[test]
fn undo_drops_selection_of_removed_object() {
    let mut core = core();
    let id = insert_rect(&mut core);
    core.set_tool(Tool::Select);
    click(&mut core, 150.0, 150.0);
    assert_eq!(core.selection(), Some(id));
    core.undo().unwrap();
    assert_eq!(core.selection(), None);
}

#[test]
fn keyboard_shortcuts_drive_history() {
    let mut core = core();
    insert_rect(&mut core);
    core.on_key_down(&Key::new("z"), ctrl());
    assert!(core.surface.is_empty());
    core.on_key_down(&Key::new("Z"), ctrl_shift());
    assert_eq!(core.surface.len(), 1);
    core.on_key_down(&Key::new("z"), ctrl());
    core.on_key_down(&Key::new("y"), Modifiers { meta: true, ..Default::default() });
    assert_eq!(core.surface.len(), 1);
}

#[test]
fn plain_z_does_nothing() {
    let mut core = core();
    insert_rect(&mut core);
    assert!(core.on_key_down(&Key::new("z"), no_modifiers()).is_empty());
    assert_eq!(core.surface.len(), 1);
}

#[test]
fn history_changed_reports_flags() {
    let mut core = core();
    let actions = {
        core.set_tool(Tool::Rectangle);
        click(&mut core, 0.0, 0.0)
    };
    assert!(has_action(&actions, |a| *a == Action::HistoryChanged { can_undo: true, can_redo: false }));
    let actions = core.undo().unwrap();
    assert!(has_action(&actions, |a| *a == Action::HistoryChanged { can_undo: false, can_redo: true }));
}

#[test]
fn twenty_five_changes_keep_twenty_snapshots() {
    let mut core = core();
    core.set_tool(Tool::Rectangle);
    for _ in 0..25 {
        click(&mut core, 0.0, 0.0);
    }
    assert_eq!(core.history.len(), 20);
    let mut undos = 0;
    while !core.undo().unwrap().is_empty() {
        undos += 1;
    }
    assert_eq!(undos, 19);
    assert_eq!(core.surface.len(), 6);
}

// =============================================================
// Viewport
// =============================================================

#[test]
fn zoom_is_clamped_and_not_checkpointed() {
    let mut core = core();
    for _ in 0..20 {
        core.zoom_in();
    }
    assert_eq!(core.camera().zoom, 3.0);
    for _ in 0..40 {
        core.zoom_out();
    }
    assert_eq!(core.camera().zoom, 0.1);
    core.reset_zoom();
    assert_eq!(core.camera(), Camera::default());
    assert_eq!(core.history.len(), 1);
}

#[test]
fn command_wheel_zooms_around_pointer() {
    let mut core = core();
    let anchor = pt(200.0, 100.0);
    let world_before = core.camera().screen_to_world(anchor);
    core.on_wheel(anchor, WheelDelta { dx: 0.0, dy: -100.0 }, ctrl());
    assert!((core.camera().zoom - 1.2).abs() < 1e-9);
    let screen_after = core.camera().world_to_screen(world_before);
    assert!((screen_after.x - anchor.x).abs() < 1e-9);
    assert!((screen_after.y - anchor.y).abs() < 1e-9);
}

#[test]
fn plain_wheel_pans() {
    let mut core = core();
    let actions = core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 10.0, dy: 20.0 }, no_modifiers());
    assert!(has_render_needed(&actions));
    assert_eq!((core.camera().pan_x, core.camera().pan_y), (-10.0, -20.0));
    assert_eq!(core.history.len(), 1);
}

#[test]
fn undo_does_not_touch_camera() {
    let mut core = core();
    insert_rect(&mut core);
    core.zoom_in();
    core.undo().unwrap();
    assert!((core.camera().zoom - 1.2).abs() < 1e-9);
}

// =============================================================
// End-to-end
// =============================================================

#[test]
fn rectangle_then_stroke_then_undo_exports_only_rectangle() {
    let mut core = core();
    core.set_fill(Fill::Solid(Color::rgb(0, 0, 200)));
    core.set_tool(Tool::Rectangle);
    click(&mut core, 0.0, 0.0);
    core.set_tool(Tool::Pen);
    core.set_brush_width(6.0);
    drag(&mut core, &[(20.0, 20.0), (40.0, 20.0), (60.0, 20.0), (80.0, 20.0), (90.0, 20.0)]);

    assert_eq!(core.history.len(), 3);
    assert_eq!(core.history.cursor(), Some(2));

    core.undo().unwrap();
    assert_eq!(core.history.cursor(), Some(1));
    assert_eq!(core.surface.len(), 1);
    assert_eq!(core.surface.objects()[0].shape.kind(), "rect");

    let out = export(&core.surface, &SkiaRasterizer::new(), &AssetStore::new(), ExportOptions::default()).unwrap();
    let img = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(50, 20).0, [255, 255, 255, 255]);
    assert_eq!(img.get_pixel(150, 150).0, [0, 0, 200, 255]);
}

#[test]
fn export_of_fresh_engine_is_rejected() {
    let core = core();
    let err = export(&core.surface, &SkiaRasterizer::new(), &AssetStore::new(), ExportOptions::default()).unwrap_err();
    assert!(matches!(err, ExportError::EmptySurface));
}
