use nalgebra_glm as glm;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: glm::Vec3,
    pub max: glm::Vec3,
}

impl Aabb {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = glm::make_vec3(iter.next()?);
        let mut aabb = Aabb {
            min: first,
            max: first,
        };
        for p in iter {
            aabb.include(&glm::make_vec3(p));
        }
        Some(aabb)
    }

    pub fn include(&mut self, p: &glm::Vec3) {
        self.min = glm::min2(&self.min, p);
        self.max = glm::max2(&self.max, p);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: glm::min2(&self.min, &other.min),
            max: glm::max2(&self.max, &other.max),
        }
    }

    pub fn corners(&self) -> [glm::Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            glm::vec3(a.x, a.y, a.z),
            glm::vec3(b.x, a.y, a.z),
            glm::vec3(b.x, b.y, a.z),
            glm::vec3(a.x, b.y, a.z),
            glm::vec3(a.x, a.y, b.z),
            glm::vec3(b.x, a.y, b.z),
            glm::vec3(b.x, b.y, b.z),
            glm::vec3(a.x, b.y, b.z),
        ]
    }

    /// Bounds of this box after transforming all eight corners.
    pub fn transformed(&self, m: &glm::Mat4) -> Aabb {
        let corners = self.corners();
        let project = |c: &glm::Vec3| {
            let p = m * glm::vec4(c.x, c.y, c.z, 1.0);
            glm::vec3(p.x, p.y, p.z)
        };
        let first = project(&corners[0]);
        let mut out = Aabb {
            min: first,
            max: first,
        };
        for c in &corners[1..] {
            out.include(&project(c));
        }
        out
    }

    pub fn center(&self) -> glm::Vec3 {
        (self.min + self.max) * 0.5
    }
}
