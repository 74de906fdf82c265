use std::f64::consts::PI;

/// Converts degrees to radians
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Rotation matrix around the X-axis
pub fn rotation_x(rad: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = rad.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, cos, -sin], [0.0, sin, cos]]
}

/// Rotation matrix around the Y-axis
pub fn rotation_y(rad: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = rad.sin_cos();
    [[cos, 0.0, sin], [0.0, 1.0, 0.0], [-sin, 0.0, cos]]
}

/// Rotation matrix around the Z-axis
pub fn rotation_z(rad: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = rad.sin_cos();
    [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]]
}

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &[[f64; 3]; 3], vector: &[f64; 3]) -> [f64; 3] {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
pub fn multiply_matrices(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Calculates the normal vector of a triangle
pub fn calculate_normal(a: &[f64; 3], b: &[f64; 3], c: &[f64; 3]) -> [f64; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let normal = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let length = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
    [normal[0] / length, normal[1] / length, normal[2] / length]
}

/// Calculates the light intensity based on the normal vector and light position
pub fn light_intensity(normal: &[f64; 3], position: &[f64; 3], light_pos: &[f64; 3]) -> f64 {
    let light_dir = [
        light_pos[0] - position[0],
        light_pos[1] - position[1],
        light_pos[2] - position[2],
    ];
    let length = (light_dir[0] * light_dir[0]
        + light_dir[1] * light_dir[1]
        + light_dir[2] * light_dir[2])
        .sqrt();
    let light_dir = [
        light_dir[0] / length,
        light_dir[1] / length,
        light_dir[2] / length,
    ];
    let dot_product =
        normal[0] * light_dir[0] + normal[1] * light_dir[1] + normal[2] * light_dir[2];
    dot_product.max(0.1) // Ensure a minimum ambient light
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn rotation_y_quarter_turn() {
        let m = rotation_y(deg_to_rad(90.0));
        let v = multiply_matrix_vector(&m, &[0.0, 0.0, 1.0]);
        assert_close(v[0], 1.0);
        assert_close(v[1], 0.0);
        assert_close(v[2], 0.0);
    }

    #[test]
    fn rotation_z_quarter_turn() {
        let m = rotation_z(deg_to_rad(90.0));
        let v = multiply_matrix_vector(&m, &[1.0, 0.0, 0.0]);
        assert_close(v[0], 0.0);
        assert_close(v[1], 1.0);
        assert_close(v[2], 0.0);
    }

    #[test]
    fn matrix_product_matches_sequential_rotation() {
        let a = rotation_x(0.3);
        let b = rotation_y(1.1);
        let v = [0.2, -0.7, 0.5];
        let combined = multiply_matrix_vector(&multiply_matrices(&a, &b), &v);
        let sequential = multiply_matrix_vector(&a, &multiply_matrix_vector(&b, &v));
        for i in 0..3 {
            assert_close(combined[i], sequential[i]);
        }
    }

    #[test]
    fn normal_is_unit_length() {
        let n = calculate_normal(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert_close(len, 1.0);
    }

    #[test]
    fn light_intensity_has_ambient_floor() {
        // Normal facing directly away from the light
        let intensity = light_intensity(&[0.0, 0.0, 1.0], &[0.0, 0.0, 0.0], &[0.0, 0.0, -5.0]);
        assert_close(intensity, 0.1);
    }
}
