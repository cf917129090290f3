//! Interaction state machine
//!
//! Pointer handling is a two-state machine: `Idle` or `Dragging` exactly one
//! entity. Transitions mutate the layout model in place and report what the
//! caller has to do next (redraw, persist) without touching any adapter.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::domain::core::{ScreenPoint, VirtualPoint};
use crate::domain::layout::{EntityId, LayoutModel};

/// Main interaction state - either idle or dragging a single icon
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(DragSession),
}

impl InteractionState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, InteractionState::Dragging(_))
    }
}

/// State during an active drag
///
/// The offset is the screen-space vector from the pointer's grab position to
/// the entity's anchor, so the icon never jumps under the pointer. Every move
/// re-derives the position from the live pointer, never from deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub entity: EntityId,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Position at grab time, restored on cancel
    pub origin: VirtualPoint,
}

/// Pointer and keyboard events the controller forwards
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(ScreenPoint),
    Move(ScreenPoint),
    Up(ScreenPoint),
    Cancel,
}

/// Final position of a dragged entity, to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub entity: EntityId,
    pub path: PathBuf,
    pub position: VirtualPoint,
}

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed
    Ignored,
    /// The model changed and the surface must be redrawn
    Redraw,
    /// The drag finished; persist and redraw
    Commit(CommitRequest),
}

impl Transition {
    pub fn needs_redraw(&self) -> bool {
        !matches!(self, Transition::Ignored)
    }
}

/// State machine for pointer interaction
pub struct InteractionMachine;

impl InteractionMachine {
    /// Processes one event and returns the new state with the requested effect
    pub fn process_event(
        current_state: InteractionState,
        event: PointerEvent,
        model: &mut LayoutModel,
    ) -> (InteractionState, Transition) {
        match (current_state, event) {
            (InteractionState::Idle, PointerEvent::Down(pointer)) => {
                let Some(entity) = model.hit_test(pointer) else {
                    trace!(?pointer, "pointer down missed every icon");
                    return (InteractionState::Idle, Transition::Ignored);
                };
                let Some(origin) = model.entity(entity).map(|e| e.position) else {
                    return (InteractionState::Idle, Transition::Ignored);
                };

                let anchor = model.to_screen(origin);
                let session = DragSession {
                    entity,
                    offset_x: anchor.x - pointer.x,
                    offset_y: anchor.y - pointer.y,
                    origin,
                };
                model.set_dragging(entity, true);
                debug!(entity = entity.index(), ?origin, "drag started");

                (InteractionState::Dragging(session), Transition::Redraw)
            }

            (InteractionState::Dragging(session), PointerEvent::Move(pointer)) => {
                let position = model.to_virtual(ScreenPoint::new(
                    pointer.x + session.offset_x,
                    pointer.y + session.offset_y,
                ));
                if !model.move_entity(session.entity, position) {
                    // The entity vanished under us (reloaded set); drop the session
                    return (InteractionState::Idle, Transition::Redraw);
                }
                trace!(entity = session.entity.index(), ?position, "drag moved");

                (InteractionState::Dragging(session), Transition::Redraw)
            }

            (InteractionState::Dragging(session), PointerEvent::Up(_)) => {
                model.set_dragging(session.entity, false);
                let transition = match model.entity(session.entity) {
                    Some(entity) => {
                        debug!(
                            entity = session.entity.index(),
                            position = ?entity.position,
                            "drag released"
                        );
                        Transition::Commit(CommitRequest {
                            entity: session.entity,
                            path: entity.path.clone(),
                            position: entity.position,
                        })
                    }
                    None => Transition::Redraw,
                };

                (InteractionState::Idle, transition)
            }

            (InteractionState::Dragging(session), PointerEvent::Cancel) => {
                model.move_entity(session.entity, session.origin);
                model.set_dragging(session.entity, false);
                debug!(entity = session.entity.index(), "drag cancelled");

                (InteractionState::Idle, Transition::Redraw)
            }

            // Down while dragging, move/up/cancel while idle - ignore event
            (state, _) => (state, Transition::Ignored),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::{DEFAULT_HIT_RADIUS, IconPosition};
    use crate::domain::monitors::{MonitorRect, VirtualCanvas};

    fn scenario_model() -> LayoutModel {
        let canvas = VirtualCanvas::from_monitors(&[MonitorRect::new(0, 0, 1920, 1080)]);
        let mut model = LayoutModel::new(canvas, DEFAULT_HIT_RADIUS);
        model.recompute_scale(960, 540);
        model.rebuild_from([IconPosition::new("/home/user/Desktop/notes.txt", 100, 200)]);
        model
    }

    #[test]
    fn default_state_is_idle() {
        assert!(matches!(InteractionState::default(), InteractionState::Idle));
    }

    #[test]
    fn drag_sequence_commits_final_position() {
        let mut model = scenario_model();

        let (state, transition) = InteractionMachine::process_event(
            InteractionState::Idle,
            PointerEvent::Down(ScreenPoint::new(50.0, 100.0)),
            &mut model,
        );
        let InteractionState::Dragging(session) = state else {
            panic!("Expected dragging state");
        };
        assert_eq!(transition, Transition::Redraw);
        assert_eq!((session.offset_x, session.offset_y), (0.0, 0.0));
        assert!(model.entities()[0].dragging);

        let (state, _) = InteractionMachine::process_event(
            state,
            PointerEvent::Move(ScreenPoint::new(60.0, 110.0)),
            &mut model,
        );
        assert_eq!(model.entities()[0].position, VirtualPoint::new(120, 220));

        let (state, transition) = InteractionMachine::process_event(
            state,
            PointerEvent::Up(ScreenPoint::new(60.0, 110.0)),
            &mut model,
        );
        assert_eq!(state, InteractionState::Idle);
        assert!(!model.entities()[0].dragging);
        match transition {
            Transition::Commit(commit) => {
                assert_eq!(commit.position, VirtualPoint::new(120, 220));
                assert_eq!(commit.path, PathBuf::from("/home/user/Desktop/notes.txt"));
            }
            other => panic!("Expected commit, got {:?}", other),
        }
    }

    #[test]
    fn grab_offset_is_preserved() {
        let mut model = scenario_model();

        // Grab 3px right and 4px below the dot's centre (distance 5)
        let (state, _) = InteractionMachine::process_event(
            InteractionState::Idle,
            PointerEvent::Down(ScreenPoint::new(53.0, 104.0)),
            &mut model,
        );
        let (_, _) = InteractionMachine::process_event(
            state,
            PointerEvent::Move(ScreenPoint::new(63.0, 114.0)),
            &mut model,
        );

        // Icon moved by the same 10px (20 virtual px), no jump to the pointer
        assert_eq!(model.entities()[0].position, VirtualPoint::new(120, 220));
    }

    #[test]
    fn miss_stays_idle() {
        let mut model = scenario_model();
        let (state, transition) = InteractionMachine::process_event(
            InteractionState::Idle,
            PointerEvent::Down(ScreenPoint::new(400.0, 400.0)),
            &mut model,
        );
        assert_eq!(state, InteractionState::Idle);
        assert_eq!(transition, Transition::Ignored);
    }

    #[test]
    fn up_without_session_is_noop() {
        let mut model = scenario_model();
        let (state, transition) = InteractionMachine::process_event(
            InteractionState::Idle,
            PointerEvent::Up(ScreenPoint::new(50.0, 100.0)),
            &mut model,
        );
        assert_eq!(state, InteractionState::Idle);
        assert_eq!(transition, Transition::Ignored);
    }

    #[test]
    fn move_while_idle_changes_nothing() {
        let mut model = scenario_model();
        let (_, transition) = InteractionMachine::process_event(
            InteractionState::Idle,
            PointerEvent::Move(ScreenPoint::new(50.0, 100.0)),
            &mut model,
        );
        assert_eq!(transition, Transition::Ignored);
        assert_eq!(model.entities()[0].position, VirtualPoint::new(100, 200));
    }

    #[test]
    fn second_down_during_drag_is_ignored() {
        let mut model = scenario_model();
        model.rebuild_from([
            IconPosition::new("/desk/a", 100, 200),
            IconPosition::new("/desk/b", 600, 600),
        ]);

        let (state, _) = InteractionMachine::process_event(
            InteractionState::Idle,
            PointerEvent::Down(ScreenPoint::new(50.0, 100.0)),
            &mut model,
        );
        let (next, transition) = InteractionMachine::process_event(
            state,
            PointerEvent::Down(ScreenPoint::new(300.0, 300.0)),
            &mut model,
        );

        assert_eq!(next, state);
        assert_eq!(transition, Transition::Ignored);
        assert!(!model.entities()[1].dragging);
    }

    #[test]
    fn cancel_restores_origin() {
        let mut model = scenario_model();
        let (state, _) = InteractionMachine::process_event(
            InteractionState::Idle,
            PointerEvent::Down(ScreenPoint::new(50.0, 100.0)),
            &mut model,
        );
        let (state, _) = InteractionMachine::process_event(
            state,
            PointerEvent::Move(ScreenPoint::new(200.0, 200.0)),
            &mut model,
        );
        let (state, transition) =
            InteractionMachine::process_event(state, PointerEvent::Cancel, &mut model);

        assert_eq!(state, InteractionState::Idle);
        assert_eq!(transition, Transition::Redraw);
        assert_eq!(model.entities()[0].position, VirtualPoint::new(100, 200));
        assert!(!model.entities()[0].dragging);
    }

    #[test]
    fn repeated_drags_do_not_accumulate_drift() {
        let canvas = VirtualCanvas::from_monitors(&[MonitorRect::new(0, 0, 1920, 1080)]);
        let mut model = LayoutModel::new(canvas, DEFAULT_HIT_RADIUS);
        model.recompute_scale(1000, 600); // non-terminating scale
        model.rebuild_from([IconPosition::new("/desk/a", 700, 300)]);

        let mut state = InteractionState::Idle;
        for _ in 0..50 {
            let at = model.to_screen(model.entities()[0].position);
            (state, _) = InteractionMachine::process_event(state, PointerEvent::Down(at), &mut model);
            (state, _) = InteractionMachine::process_event(state, PointerEvent::Move(at), &mut model);
            (state, _) = InteractionMachine::process_event(state, PointerEvent::Up(at), &mut model);
        }

        assert_eq!(model.entities()[0].position, VirtualPoint::new(700, 300));
    }
}
