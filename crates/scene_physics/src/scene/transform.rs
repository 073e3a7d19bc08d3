//! Parent-relative node transform with lazy compose/decompose caching
//!
//! A node's local placement has two representations: the composed 4x4 matrix
//! and the decomposed position/rotation/scale channels. Whichever was written
//! last is authoritative; the other is rebuilt on first read.

use std::cell::Cell;

use crate::foundation::math::{Mat4, Quat, Transform, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheState {
    /// Both representations agree
    Synced,
    /// Channels were written; the matrix must be recomposed
    MatrixStale,
    /// The matrix was written; the channels must be decomposed
    ChannelsStale,
}

/// Local (parent-relative) transform of a scene node
#[derive(Debug, Clone)]
pub struct LocalTransform {
    channels: Cell<Transform>,
    matrix: Cell<Mat4>,
    state: Cell<CacheState>,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::new(Transform::identity())
    }
}

impl LocalTransform {
    /// Create from decomposed channels
    pub fn new(channels: Transform) -> Self {
        Self {
            channels: Cell::new(channels),
            matrix: Cell::new(Mat4::identity()),
            state: Cell::new(CacheState::MatrixStale),
        }
    }

    /// Create from a composed matrix
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            channels: Cell::new(Transform::identity()),
            matrix: Cell::new(matrix),
            state: Cell::new(CacheState::ChannelsStale),
        }
    }

    /// Whether the cached matrix is current
    pub fn is_composed(&self) -> bool {
        self.state.get() != CacheState::MatrixStale
    }

    /// Composed local matrix
    pub fn matrix(&self) -> Mat4 {
        if self.state.get() == CacheState::MatrixStale {
            self.matrix.set(self.channels.get().to_matrix());
            self.state.set(CacheState::Synced);
        }
        self.matrix.get()
    }

    /// Decomposed local channels
    pub fn channels(&self) -> Transform {
        if self.state.get() == CacheState::ChannelsStale {
            self.channels.set(Transform::from_matrix(self.matrix.get()));
            self.state.set(CacheState::Synced);
        }
        self.channels.get()
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.channels().position
    }

    /// Local rotation
    pub fn rotation(&self) -> Quat {
        self.channels().rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.channels().scale
    }

    /// Replace the composed matrix; channels decompose lazily
    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix.set(matrix);
        self.state.set(CacheState::ChannelsStale);
    }

    /// Replace all channels; the matrix recomposes lazily
    pub fn set_channels(&mut self, channels: Transform) {
        self.channels.set(channels);
        self.state.set(CacheState::MatrixStale);
    }

    /// Set local position
    pub fn set_position(&mut self, position: Vec3) {
        let mut channels = self.channels();
        channels.position = position;
        self.set_channels(channels);
    }

    /// Set local rotation
    pub fn set_rotation(&mut self, rotation: Quat) {
        let mut channels = self.channels();
        channels.rotation = rotation;
        self.set_channels(channels);
    }

    /// Set local scale
    pub fn set_scale(&mut self, scale: Vec3) {
        let mut channels = self.channels();
        channels.scale = scale;
        self.set_channels(channels);
    }
}
