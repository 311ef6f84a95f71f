/// Draw topology of a pipeline.
///
/// `Quads` is CPU-side sugar: four vertices per face, expanded to two
/// triangles by the shared quad index pattern at submission time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Topology {
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    Quads,
}

impl Topology {
    /// Number of indices a sequential-pattern draw needs for `vertex_count`
    /// vertices.
    ///
    /// Quads emit six indices per four vertices; every other topology consumes
    /// vertices in order, one index each.
    #[inline]
    pub fn index_count(self, vertex_count: u32) -> u32 {
        match self {
            Topology::Quads => vertex_count / 4 * 6,
            _ => vertex_count,
        }
    }

    /// Whether meshes of this topology are depth-sorted before upload.
    ///
    /// Only two-triangle quads get the back-to-front sort; the translucency
    /// guarantee is scoped to a single draw call.
    #[inline]
    pub fn is_sorted(self) -> bool {
        matches!(self, Topology::Quads)
    }

    /// Highest vertex index referenced by the sequential pattern for
    /// `vertex_count` vertices, or `None` for an empty mesh.
    #[inline]
    pub fn max_index(self, vertex_count: u32) -> Option<u32> {
        if vertex_count == 0 {
            None
        } else {
            Some(vertex_count - 1)
        }
    }
}

/// Width of index values in an index buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IndexKind {
    U16,
    U32,
}

impl IndexKind {
    #[inline]
    pub const fn bytes(self) -> u64 {
        match self {
            IndexKind::U16 => 2,
            IndexKind::U32 => 4,
        }
    }

    /// Narrowest kind able to address `vertex_count` vertices.
    #[inline]
    pub fn for_vertex_count(vertex_count: u32) -> Self {
        if vertex_count <= u16::MAX as u32 + 1 {
            IndexKind::U16
        } else {
            IndexKind::U32
        }
    }
}
