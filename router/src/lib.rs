//! Interactive push-and-shove PCB routing core.
//!
//! This crate implements the in-memory geometric world model, collision and
//! hull engine, and the placement/drag algorithms of an interactive
//! "push-and-shove" printed-circuit-board router. It has no knowledge of
//! board-file persistence, UI/event loops, or the host application's rule
//! database and footprint cache — those remain external collaborators
//! reached only through the traits in [`iface`] and [`rule`].
//!
//! # Concurrency
//!
//! The core is single-threaded cooperative: every algorithm entry point is
//! driven to completion by a single external event (start, move, fix,
//! toggle-via, undo, abort) with no internal thread pool, preemption or
//! async. The one exception — a background footprint-cache loader — lives
//! entirely in the host and is never observed by the core. [`node::Node`]
//! branches form a tree; only the placer's current branch tip is ever
//! mutated, and the [`rule::RuleResolver`] is assumed thread-unsafe and is
//! only ever called from the router's own thread.

#![warn(missing_docs)]

pub mod collision;
pub mod diff_pair;
pub mod dragger;
pub mod error;
pub mod iface;
pub mod id;
pub mod item;
pub mod joint;
pub mod meander;
pub mod node;
pub mod placer;
pub mod posture;
pub mod rule;
pub mod shove;
pub mod sizes;
pub mod walkaround;
