//! CPU-side vertex storage for the polyline, mirrored into a GPU texture.
//!
//! Each vertex is four packed floats (posX-high, posY-high, posX-low,
//! posY-low) occupying one texel of a square RGBA32F texture. The store
//! tracks confirmed vertices plus at most one live (pending) vertex that an
//! interactive tool overwrites on every pointer move before committing it.

use log::warn;

use crate::coord::MercatorCoord;
use crate::encode;

/// Floats per vertex: high X/Y + low X/Y, one RGBA texel.
pub const FLOATS_PER_VERTEX: usize = 4;

/// One polyline vertex in split high/low form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub high_x: f32,
    pub high_y: f32,
    pub low_x: f32,
    pub low_y: f32,
}

impl Vertex {
    fn encode(p: MercatorCoord) -> Self {
        let x = encode::split(p.x);
        let y = encode::split(p.y);
        Self {
            high_x: x.high,
            high_y: y.high,
            low_x: x.low,
            low_y: y.low,
        }
    }

    pub fn texel(&self) -> [f32; FLOATS_PER_VERTEX] {
        [self.high_x, self.high_y, self.low_x, self.low_y]
    }
}

/// The live (uncommitted) slot, made explicit rather than inferred from a
/// boolean flag plus array contents. Confirmed vertices are folded into
/// [`VertexStore::confirmed_count`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LiveSlot {
    #[default]
    Empty,
    Pending(Vertex),
}

/// Fixed-capacity vertex sequence with a square-texture index mapping.
///
/// Linear index `i` maps to texel `(i % side, i / side)` where
/// `side = ceil(sqrt(capacity))`. The CPU array always holds the full
/// `side * side` texel extent so bulk uploads cover the whole texture.
#[derive(Debug)]
pub struct VertexStore {
    capacity: usize,
    side: u32,
    data: Vec<f32>,
    confirmed: usize,
    live: LiveSlot,
}

impl VertexStore {
    /// Create an empty store. `capacity` is the total texel budget; the
    /// final texel is reserved (see [`Self::confirm_point`]), so usable
    /// confirmed capacity is `capacity - 2`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "vertex store capacity must be at least 2");
        let side = (capacity as f64).sqrt().ceil() as u32;
        let texels = (side * side) as usize;
        Self {
            capacity,
            side,
            data: vec![0.0; texels * FLOATS_PER_VERTEX],
            confirmed: 0,
            live: LiveSlot::Empty,
        }
    }

    /// Side length of the square mirror texture.
    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of confirmed vertices (excludes the live point).
    pub fn confirmed_count(&self) -> usize {
        self.confirmed
    }

    /// Confirmed vertices plus the live vertex, if any — the number of
    /// points the renderer draws.
    pub fn point_count(&self) -> usize {
        self.confirmed + usize::from(self.is_pending())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.live, LiveSlot::Pending(_))
    }

    pub fn live(&self) -> LiveSlot {
        self.live
    }

    /// Map a linear vertex index to its texel coordinate.
    pub fn texel_of(&self, index: usize) -> (u32, u32) {
        let i = index as u32;
        (i % self.side, i / self.side)
    }

    /// The four packed floats stored at `index`.
    pub fn texel(&self, index: usize) -> [f32; FLOATS_PER_VERTEX] {
        let base = index * FLOATS_PER_VERTEX;
        [
            self.data[base],
            self.data[base + 1],
            self.data[base + 2],
            self.data[base + 3],
        ]
    }

    /// Full texture extent as floats, for bulk uploads.
    pub fn raw(&self) -> &[f32] {
        &self.data
    }

    /// Begin or overwrite the live point at slot `confirmed_count`.
    ///
    /// May be called once per pointer-move event; every call overwrites the
    /// same slot until [`Self::confirm_point`] promotes it. Returns the
    /// linear index whose mirror texel must be re-uploaded.
    pub fn update_live_point(&mut self, position: MercatorCoord) -> usize {
        let vertex = Vertex::encode(position);
        let index = self.confirmed;
        let base = index * FLOATS_PER_VERTEX;
        self.data[base..base + FLOATS_PER_VERTEX].copy_from_slice(&vertex.texel());
        self.live = LiveSlot::Pending(vertex);
        index
    }

    /// Promote the pending point to a confirmed vertex.
    ///
    /// No-op when nothing is pending. Rejected (with a warning, no
    /// mutation) once `confirmed + 1 == capacity - 1`: the final texel is
    /// deliberately reserved so a live-point slot always remains available
    /// after any successful confirm. Returns whether a vertex was confirmed.
    pub fn confirm_point(&mut self) -> bool {
        match self.live {
            LiveSlot::Empty => false,
            LiveSlot::Pending(_) => {
                if self.confirmed + 1 >= self.capacity - 1 {
                    warn!(
                        "vertex store is full ({} of {} confirmable), cannot add more points",
                        self.confirmed,
                        self.capacity - 2,
                    );
                    return false;
                }
                self.confirmed += 1;
                self.live = LiveSlot::Empty;
                true
            },
        }
    }

    /// Reset to empty: zero every slot, clear the live point.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
        self.confirmed = 0;
        self.live = LiveSlot::Empty;
    }
}
