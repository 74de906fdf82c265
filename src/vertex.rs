/// Vertex with 3D position, projected cell position, and normal
pub struct Vertex {
    pub position: [f64; 3],
    pub cell_position: [f64; 2],
    pub normal: [f64; 3],
}
