//! Terminal cell renderer: a glyph/color buffer with a z-buffer, a software
//! triangle rasterizer for the cube faces, Bresenham edges for wireframe
//! mode, and the projection from animation state to cell coordinates.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

use crate::effects::FaceEffect;
use crate::math::{
    calculate_normal, deg_to_rad, edge_function, light_intensity, multiply_matrices,
    multiply_matrix_vector, rotation_x, rotation_y, rotation_z,
};
use crate::state::AnimationState;
use crate::vertex::Vertex;

/// Cube vertices
pub const CUBE_VERTICES: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// Cube faces (each face is defined by 4 vertex indices)
pub const CUBE_FACES: [(usize, usize, usize, usize); 6] = [
    (0, 1, 2, 3),
    (5, 4, 7, 6),
    (4, 0, 3, 7),
    (1, 5, 6, 2),
    (4, 5, 1, 0),
    (3, 2, 6, 7),
];

/// Cube edges (pairs of vertex indices)
pub const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0), // Front face
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4), // Back face
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7), // Connecting edges
];

/// Face colors
const FACE_COLORS: [(u8, u8, u8); 6] = [
    (255, 0, 0),   // Red
    (0, 255, 0),   // Green
    (0, 0, 255),   // Blue
    (255, 255, 0), // Yellow
    (255, 0, 255), // Magenta
    (0, 255, 255), // Cyan
];

/// Light source position in world space
const LIGHT_POS: [f64; 3] = [2.0, 2.0, -5.0];

/// Shade ramp from dimmest to brightest cell
const SHADE_RAMP: [char; 10] = ['.', ',', ':', ';', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 2.0;

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: char,
    color: (u8, u8, u8),
}

const EMPTY: Cell = Cell {
    glyph: ' ',
    color: (0, 0, 0),
};

/// Glyph/color buffer with a z-buffer, repainted every tick
pub struct CellBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    depth: Vec<f64>,
}

impl CellBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![EMPTY; len],
            depth: vec![f64::INFINITY; len],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn clear(&mut self) {
        self.cells.fill(EMPTY);
        self.depth.fill(f64::INFINITY);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        Some(y as usize * usize::from(self.width) + x as usize)
    }

    /// Writes a cell without depth testing. Out-of-bounds writes are dropped.
    pub fn put(&mut self, x: i32, y: i32, glyph: char, color: (u8, u8, u8)) {
        if let Some(offset) = self.index(x, y) {
            self.cells[offset] = Cell { glyph, color };
        }
    }

    /// Depth-tested write; smaller z wins
    fn put_depth(&mut self, x: i32, y: i32, z: f64, glyph: char, color: (u8, u8, u8)) {
        if let Some(offset) = self.index(x, y) {
            if z < self.depth[offset] {
                self.depth[offset] = z;
                self.cells[offset] = Cell { glyph, color };
            }
        }
    }

    pub fn put_str(&mut self, x: i32, y: i32, text: &str, color: (u8, u8, u8)) {
        for (i, glyph) in text.chars().enumerate() {
            self.put(x + i as i32, y, glyph, color);
        }
    }

    /// Glyph at a cell, for inspection in tests
    pub fn glyph_at(&self, x: i32, y: i32) -> char {
        self.index(x, y).map_or(' ', |offset| self.cells[offset].glyph)
    }

    /// Count of non-blank cells
    pub fn populated(&self) -> usize {
        self.cells.iter().filter(|c| c.glyph != ' ').count()
    }

    /// Writes the whole buffer to the terminal in one queued batch
    pub fn flush(&self, out: &mut impl Write) -> io::Result<()> {
        let mut current: Option<(u8, u8, u8)> = None;
        for y in 0..self.height {
            queue!(out, cursor::MoveTo(0, y))?;
            for x in 0..self.width {
                let cell = self.cells[usize::from(y) * usize::from(self.width) + usize::from(x)];
                if cell.glyph != ' ' && current != Some(cell.color) {
                    let (r, g, b) = cell.color;
                    queue!(out, SetForegroundColor(Color::Rgb { r, g, b }))?;
                    current = Some(cell.color);
                }
                queue!(out, Print(cell.glyph))?;
            }
        }
        queue!(out, ResetColor)?;
        out.flush()
    }
}

/// Transforms and projects the cube for the current animation state.
///
/// The cube is scaled per axis, rotated X then Y then Z (degrees, unbounded),
/// and projected orthographically with 2:1 aspect compensation so it stays
/// square in terminal cells.
pub fn project_cube(anim: &AnimationState, width: u16, height: u16) -> Vec<Vertex> {
    let center_x = f64::from(width) / 2.0;
    let center_y = f64::from(height) / 2.0;
    let scale = (f64::from(width) / CELL_ASPECT).min(f64::from(height)) / 6.0;

    let rx = rotation_x(deg_to_rad(anim.rotation_x));
    let ry = rotation_y(deg_to_rad(anim.rotation_y));
    let rz = rotation_z(deg_to_rad(anim.rotation_z));
    let rotation = multiply_matrices(&rx, &multiply_matrices(&ry, &rz));

    // Transform vertices
    let transformed: Vec<[f64; 3]> = CUBE_VERTICES
        .iter()
        .map(|&[x, y, z]| {
            let scaled = [x * anim.scale_x, y * anim.scale_y, z * anim.scale_z];
            multiply_matrix_vector(&rotation, &scaled)
        })
        .collect();

    // Compute vertex normals by accumulating face normals
    let mut vertex_normals = vec![[0.0; 3]; CUBE_VERTICES.len()];
    for &(a, b, c, d) in CUBE_FACES.iter() {
        let normal = calculate_normal(&transformed[a], &transformed[b], &transformed[c]);
        for &index in &[a, b, c, d] {
            vertex_normals[index][0] += normal[0];
            vertex_normals[index][1] += normal[1];
            vertex_normals[index][2] += normal[2];
        }
    }
    for normal in vertex_normals.iter_mut() {
        let length =
            (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
        normal[0] /= length;
        normal[1] /= length;
        normal[2] /= length;
    }

    transformed
        .iter()
        .zip(vertex_normals.iter())
        .map(|(&position, &normal)| {
            let cell_x = position[0] * scale * CELL_ASPECT + center_x;
            let cell_y = position[1] * scale + center_y;
            Vertex {
                position,
                cell_position: [cell_x, cell_y],
                normal,
            }
        })
        .collect()
}

/// Rasterizes a shaded triangle into the cell buffer
pub fn draw_triangle(
    buf: &mut CellBuffer,
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    depth_bias: f64,
    base_color: (u8, u8, u8),
    shade_factor: f64,
) {
    // Compute bounding box of the triangle
    let min_x = v0.cell_position[0]
        .min(v1.cell_position[0])
        .min(v2.cell_position[0])
        .floor()
        .max(0.0) as i32;
    let max_x = v0.cell_position[0]
        .max(v1.cell_position[0])
        .max(v2.cell_position[0])
        .ceil()
        .min(f64::from(buf.width()) - 1.0) as i32;
    let min_y = v0.cell_position[1]
        .min(v1.cell_position[1])
        .min(v2.cell_position[1])
        .floor()
        .max(0.0) as i32;
    let max_y = v0.cell_position[1]
        .max(v1.cell_position[1])
        .max(v2.cell_position[1])
        .ceil()
        .min(f64::from(buf.height()) - 1.0) as i32;

    let area = edge_function(&v0.cell_position, &v1.cell_position, &v2.cell_position);
    if area.abs() < f64::EPSILON {
        return; // Degenerate triangle
    }
    // Normalize winding so back-facing projections still rasterize; the
    // z-buffer sorts out occlusion
    let flip = if area < 0.0 { -1.0 } else { 1.0 };
    let area = area * flip;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = [f64::from(x) + 0.5, f64::from(y) + 0.5];

            let w0 = flip * edge_function(&v1.cell_position, &v2.cell_position, &p);
            let w1 = flip * edge_function(&v2.cell_position, &v0.cell_position, &p);
            let w2 = flip * edge_function(&v0.cell_position, &v1.cell_position, &p);

            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                // Inside triangle; normalize barycentric coordinates
                let w0 = w0 / area;
                let w1 = w1 / area;
                let w2 = w2 / area;

                // Interpolate position
                let px = v0.position[0] * w0 + v1.position[0] * w1 + v2.position[0] * w2;
                let py = v0.position[1] * w0 + v1.position[1] * w1 + v2.position[1] * w2;
                let pz = v0.position[2] * w0 + v1.position[2] * w1 + v2.position[2] * w2;

                // Interpolate normal
                let nx = v0.normal[0] * w0 + v1.normal[0] * w1 + v2.normal[0] * w2;
                let ny = v0.normal[1] * w0 + v1.normal[1] * w1 + v2.normal[1] * w2;
                let nz = v0.normal[2] * w0 + v1.normal[2] * w1 + v2.normal[2] * w2;
                let length = (nx * nx + ny * ny + nz * nz).sqrt();
                let normal = [nx / length, ny / length, nz / length];

                let intensity = light_intensity(&normal, &[px, py, pz], &LIGHT_POS);
                let level = (intensity * shade_factor).clamp(0.05, 1.0);

                let ramp_index = (level * (SHADE_RAMP.len() - 1) as f64).round() as usize;
                let glyph = SHADE_RAMP[ramp_index.min(SHADE_RAMP.len() - 1)];
                let color = scale_color(base_color, level);

                buf.put_depth(x, y, pz + depth_bias, glyph, color);
            }
        }
    }
}

/// Draws a line between two cells using Bresenham's algorithm
pub fn draw_line(
    buf: &mut CellBuffer,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    glyph: char,
    color: (u8, u8, u8),
) {
    let (mut x0, mut y0, x1, y1) = (
        x0.round() as i32,
        y0.round() as i32,
        x1.round() as i32,
        y1.round() as i32,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy

    loop {
        buf.put(x0, y0, glyph, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Renders the cube for the current animation state at `t` seconds of
/// elapsed time. Face shading and depth bias come from the cosmetic effect
/// layer, recomputed from scratch every call.
pub fn draw_cube(buf: &mut CellBuffer, anim: &AnimationState, t: f64, wireframe: bool) {
    let vertices = project_cube(anim, buf.width(), buf.height());

    if wireframe {
        for &(start, end) in &CUBE_EDGES {
            let v0 = &vertices[start];
            let v1 = &vertices[end];
            draw_line(
                buf,
                v0.cell_position[0],
                v0.cell_position[1],
                v1.cell_position[0],
                v1.cell_position[1],
                '#',
                (255, 255, 255),
            );
        }
        return;
    }

    for (face_index, &(a, b, c, d)) in CUBE_FACES.iter().enumerate() {
        let fx = FaceEffect::at(t, face_index);
        // translateZ pushes toward the viewer; smaller z wins the depth test
        let depth_bias = -fx.distortion * 0.05;
        let shade = fx.shade_factor();
        let color = FACE_COLORS[face_index];

        draw_triangle(buf, &vertices[a], &vertices[b], &vertices[c], depth_bias, color, shade);
        draw_triangle(buf, &vertices[a], &vertices[c], &vertices[d], depth_bias, color, shade);
    }
}

fn scale_color(color: (u8, u8, u8), level: f64) -> (u8, u8, u8) {
    (
        (f64::from(color.0) * level).min(255.0) as u8,
        (f64::from(color.1) * level).min(255.0) as u8,
        (f64::from(color.2) * level).min(255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f64, y: f64, z: f64) -> Vertex {
        Vertex {
            position: [0.0, 0.0, z],
            cell_position: [x, y],
            normal: [0.0, 0.0, -1.0],
        }
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut buf = CellBuffer::new(10, 5);
        buf.put(-1, 0, 'x', (255, 255, 255));
        buf.put(10, 0, 'x', (255, 255, 255));
        buf.put(0, 5, 'x', (255, 255, 255));
        assert_eq!(buf.populated(), 0);
    }

    #[test]
    fn put_str_writes_each_glyph() {
        let mut buf = CellBuffer::new(20, 3);
        buf.put_str(2, 1, "FPS: 60", (255, 255, 255));
        assert_eq!(buf.glyph_at(2, 1), 'F');
        assert_eq!(buf.glyph_at(8, 1), '0');
    }

    #[test]
    fn triangle_fills_its_interior() {
        let mut buf = CellBuffer::new(20, 20);
        let v0 = vertex(2.0, 2.0, 0.0);
        let v1 = vertex(18.0, 2.0, 0.0);
        let v2 = vertex(2.0, 18.0, 0.0);
        draw_triangle(&mut buf, &v0, &v1, &v2, 0.0, (255, 0, 0), 1.0);
        assert_ne!(buf.glyph_at(5, 5), ' ');
    }

    #[test]
    fn reversed_winding_still_rasterizes() {
        let mut buf = CellBuffer::new(20, 20);
        let v0 = vertex(2.0, 2.0, 0.0);
        let v1 = vertex(18.0, 2.0, 0.0);
        let v2 = vertex(2.0, 18.0, 0.0);
        draw_triangle(&mut buf, &v2, &v1, &v0, 0.0, (255, 0, 0), 1.0);
        assert_ne!(buf.glyph_at(5, 5), ' ');
    }

    #[test]
    fn nearer_triangle_wins_the_depth_test() {
        let mut buf = CellBuffer::new(20, 20);
        let far = [vertex(2.0, 2.0, 5.0), vertex(18.0, 2.0, 5.0), vertex(2.0, 18.0, 5.0)];
        let near = [vertex(2.0, 2.0, -5.0), vertex(18.0, 2.0, -5.0), vertex(2.0, 18.0, -5.0)];
        draw_triangle(&mut buf, &far[0], &far[1], &far[2], 0.0, (255, 0, 0), 1.0);
        let after_far = buf.glyph_at(5, 5);
        draw_triangle(&mut buf, &near[0], &near[1], &near[2], 0.0, (0, 255, 0), 0.2);
        assert_ne!(after_far, ' ');
        // The dim near triangle overwrote the bright far one
        assert_ne!(buf.glyph_at(5, 5), after_far);
    }

    #[test]
    fn line_covers_both_endpoints() {
        let mut buf = CellBuffer::new(10, 10);
        draw_line(&mut buf, 1.0, 1.0, 8.0, 6.0, '#', (255, 255, 255));
        assert_eq!(buf.glyph_at(1, 1), '#');
        assert_eq!(buf.glyph_at(8, 6), '#');
    }

    #[test]
    fn projection_yields_unit_normals_inside_the_screen() {
        let anim = AnimationState::new(0.0);
        let vertices = project_cube(&anim, 80, 24);
        assert_eq!(vertices.len(), 8);
        for v in &vertices {
            let n = v.normal;
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-9);
            assert!(v.cell_position[0] > 0.0 && v.cell_position[0] < 80.0);
            assert!(v.cell_position[1] > 0.0 && v.cell_position[1] < 24.0);
        }
    }

    #[test]
    fn cube_draws_something() {
        let anim = AnimationState::new(0.0);
        let mut buf = CellBuffer::new(60, 24);
        draw_cube(&mut buf, &anim, 0.0, false);
        assert!(buf.populated() > 20);

        let mut wire = CellBuffer::new(60, 24);
        draw_cube(&mut wire, &anim, 0.0, true);
        assert!(wire.populated() > 20);
    }

    #[test]
    fn clear_resets_cells_and_depth() {
        let mut buf = CellBuffer::new(10, 10);
        let v = [vertex(1.0, 1.0, 0.0), vertex(8.0, 1.0, 0.0), vertex(1.0, 8.0, 0.0)];
        draw_triangle(&mut buf, &v[0], &v[1], &v[2], 0.0, (255, 0, 0), 1.0);
        buf.clear();
        assert_eq!(buf.populated(), 0);
    }
}
