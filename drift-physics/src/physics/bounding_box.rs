use glam::{Mat3, Vec3};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl BoundingBox {
    pub fn from_vecs(min: Vec3, max: Vec3) -> BoundingBox {
        BoundingBox {
            min_x: min.x,
            max_x: max.x,
            min_y: min.y,
            max_y: max.y,
            min_z: min.z,
            max_z: max.z,
        }
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> BoundingBox {
        BoundingBox::from_vecs(center - half_extents, center + half_extents)
    }

    // An axis-aligned box around a box of the given half extents, rotated by
    // `yaw` about the vertical axis and centred on `pos`.
    pub fn around_yawed_box(pos: Vec3, half_extents: Vec3, yaw: f32) -> BoundingBox {
        let rotation = Mat3::from_rotation_y(yaw);

        // because of symmetry, we only need to rotate four corners all on the
        // same face; doesn't matter which face
        let corners = [
            Vec3::new(half_extents.x, half_extents.y, half_extents.z),
            Vec3::new(-half_extents.x, half_extents.y, half_extents.z),
            Vec3::new(half_extents.x, half_extents.y, -half_extents.z),
            Vec3::new(-half_extents.x, half_extents.y, -half_extents.z),
        ];

        // symmetry! max in one direction is min in the other direction
        let reach = corners
            .iter()
            .map(|corner| rotation.mul_vec3(*corner).abs())
            .fold(Vec3::ZERO, Vec3::max);

        BoundingBox::from_center(pos, reach)
    }

    pub fn pos(&self) -> Vec3 {
        Vec3::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
            (self.min_z + self.max_z) / 2.0,
        )
    }

    pub fn is_colliding(&self, other: &BoundingBox) -> bool {
        // https://developer.mozilla.org/en-US/docs/Games/Techniques/3D_collision_detection
        (self.min_x <= other.max_x && self.max_x >= other.min_x)
            && (self.min_y <= other.max_y && self.max_y >= other.min_y)
            && (self.min_z <= other.max_z && self.max_z >= other.min_z)
    }

    // How far `self` has to move along x or z to stop overlapping `other`,
    // picking the shallower of the two. Signed so that adding it to the
    // position of `self` separates the boxes.
    pub fn horizontal_push_out(&self, other: &BoundingBox) -> Vec3 {
        let push_x = if self.pos().x < other.pos().x {
            other.min_x - self.max_x
        } else {
            other.max_x - self.min_x
        };
        let push_z = if self.pos().z < other.pos().z {
            other.min_z - self.max_z
        } else {
            other.max_z - self.min_z
        };

        if push_x.abs() < push_z.abs() {
            Vec3::new(push_x, 0.0, 0.0)
        } else {
            Vec3::new(0.0, 0.0, push_z)
        }
    }
}
