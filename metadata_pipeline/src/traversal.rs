// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Traversal Substrate
//!
//! This module provides the uniform payload-walk machinery validating
//! stages build on: a pre-order traversal over an arbitrary tree-shaped
//! payload, with a per-item context owning a deferred-mutation queue.
//!
//! ## Overview
//!
//! An [`ItemTraversal`] supplies:
//!
//! - node enumeration (`root`, `children`) over a node *handle* type,
//!   keeping the walk agnostic of the payload's concrete DOM
//! - a fresh [`TraversalContext`] per item (`build_context`)
//! - the per-node work (`applicable`, `visit`)
//!
//! [`TraversalStage`] drives the walk item by item: nodes are visited in
//! pre-order, the payload stays immutably borrowed for the whole walk, and
//! every mutation the visitor wants goes through the context's deferred
//! queue, applied once at [`TraversalContext::end`]. Deferring is not a
//! style choice here - visiting hands out only shared references, so the
//! borrow checker itself enforces that the tree cannot change under the
//! walk.
//!
//! ## Writing a traversal
//!
//! For XML payloads the node handle is whatever the DOM collaborator uses
//! to address an element (a node id, an index path). Other payload shapes
//! plug in the same way; the framework never looks inside a node.

use std::marker::PhantomData;

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::{Item, ItemCollection};
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::stage::Stage;

/// A mutation queued during a walk and applied at the end.
pub type DeferredAction<T> = Box<dyn FnOnce(&mut T) -> Result<(), PipelineError> + Send>;

/// Ordered queue of deferred mutations. Contexts embed one.
pub struct DeferredQueue<T> {
    actions: Vec<DeferredAction<T>>,
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Appends an action; actions run in queue order.
    pub fn defer(&mut self, action: DeferredAction<T>) {
        self.actions.push(action);
    }

    /// Number of queued actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Applies every queued action in order. Consuming `self` makes
    /// "exactly once" structural.
    pub fn apply(self, payload: &mut T) -> Result<(), PipelineError> {
        for action in self.actions {
            action(payload)?;
        }
        Ok(())
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-item state for one walk.
pub trait TraversalContext<T>: Send {
    /// Queues a mutation for application at the end of the walk.
    fn defer(&mut self, action: DeferredAction<T>);

    /// Ends the walk, applying queued mutations in order.
    fn end(self, payload: &mut T) -> Result<(), PipelineError>
    where
        Self: Sized;
}

/// Context with no state beyond the deferred queue.
pub struct SimpleTraversalContext<T> {
    queue: DeferredQueue<T>,
}

impl<T> SimpleTraversalContext<T> {
    pub fn new() -> Self {
        Self {
            queue: DeferredQueue::new(),
        }
    }
}

impl<T> Default for SimpleTraversalContext<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> TraversalContext<T> for SimpleTraversalContext<T> {
    fn defer(&mut self, action: DeferredAction<T>) {
        self.queue.defer(action);
    }

    fn end(self, payload: &mut T) -> Result<(), PipelineError> {
        self.queue.apply(payload)
    }
}

/// A payload walk plugged into a [`TraversalStage`].
pub trait ItemTraversal<T>: Send + Sync {
    /// Handle addressing one node of the payload.
    type Node: Clone;

    /// Per-item walk state.
    type Context: TraversalContext<T>;

    /// Builds a fresh context for one item.
    fn build_context(&self, item: &Item<T>) -> Self::Context;

    /// The root node of the payload.
    fn root(&self, payload: &T) -> Self::Node;

    /// Child nodes, in document order.
    fn children(&self, payload: &T, node: &Self::Node) -> Vec<Self::Node>;

    /// Whether the node should be visited.
    fn applicable(&self, payload: &T, node: &Self::Node, context: &Self::Context) -> bool;

    /// Per-node work. Mutations must go through `context.defer`.
    fn visit(
        &self,
        payload: &T,
        node: &Self::Node,
        context: &mut Self::Context,
    ) -> Result<(), PipelineError>;
}

/// Stage running an [`ItemTraversal`] over every item.
pub struct TraversalStage<T, V> {
    base: ComponentBase,
    traversal: V,
    _payload: PhantomData<fn(T)>,
}

impl<T, V: ItemTraversal<T>> TraversalStage<T, V> {
    pub fn new(traversal: V) -> Self {
        Self {
            base: ComponentBase::requiring_id(std::any::type_name::<Self>()),
            traversal,
            _payload: PhantomData,
        }
    }
}

impl<T, V: ItemTraversal<T>> Component for TraversalStage<T, V> {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl<T: Send, V: ItemTraversal<T>> Stage<T> for TraversalStage<T, V> {
    fn do_execute(&self, items: &mut ItemCollection<T>) -> Result<(), PipelineError> {
        for item in items.iter_mut() {
            let mut context = self.traversal.build_context(item);

            {
                let payload = item.payload();
                let mut stack = vec![self.traversal.root(payload)];
                while let Some(node) = stack.pop() {
                    if self.traversal.applicable(payload, &node, &context) {
                        self.traversal.visit(payload, &node, &mut context)?;
                    }
                    let mut children = self.traversal.children(payload, &node);
                    children.reverse();
                    stack.extend(children);
                }
            }

            context.end(item.payload_mut())?;
        }
        Ok(())
    }
}
