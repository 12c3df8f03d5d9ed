//! Ear-clipping triangulation with hole bridging
//!
//! Vertices live in an arena of nodes linked into a circular doubly-linked
//! ring by index. Large rings get a z-order index (a second, sorted linked
//! list over Morton codes) so ear tests only scan a spatial neighbourhood.
//! Coordinates are widened to f64 for the orientation predicates.

/// Rings with more coordinates than this (80 points) get the z-order index
pub const HASH_THRESHOLD: usize = 80 * 2;

/// Depth after which the split fallback gives up on a ring
pub const MAX_SPLIT_DEPTH: u32 = 32;

#[derive(Clone, Copy, Debug)]
struct Node {
    /// Vertex index into the caller's point list
    i: u32,
    x: f64,
    y: f64,
    prev: usize,
    next: usize,
    z: i32,
    prev_z: Option<usize>,
    next_z: Option<usize>,
    /// A single-point hole; never filtered out
    steiner: bool,
}

impl Node {
    fn new(i: u32, x: f64, y: f64) -> Self {
        Self {
            i,
            x,
            y,
            prev: 0,
            next: 0,
            z: 0,
            prev_z: None,
            next_z: None,
            steiner: false,
        }
    }
}

/// Triangulate a flat `[x0, y0, x1, y1, ...]` list
///
/// `hole_indices` are vertex indices where each hole ring starts; the outer
/// ring runs up to the first hole. Returns vertex indices, three per triangle.
pub fn earcut(data: &[f32], hole_indices: &[usize]) -> Vec<u32> {
    triangulate(data, hole_indices, true)
}

/// `earcut` without the z-order index, whatever the ring size
pub fn earcut_linear(data: &[f32], hole_indices: &[usize]) -> Vec<u32> {
    triangulate(data, hole_indices, false)
}

/// Triangulate and append the indices to `out`, shifted by `index_offset`
pub fn earcut_into(data: &[f32], hole_indices: &[usize], index_offset: u32, out: &mut Vec<u32>) {
    let triangles = earcut(data, hole_indices);
    out.extend(triangles.into_iter().map(|i| i + index_offset));
}

/// Relative difference between the polygon's area and the triangles' area
///
/// Zero for a perfect triangulation.
pub fn deviation(data: &[f32], hole_indices: &[usize], triangles: &[u32]) -> f64 {
    let coords = widen(data);
    let holes = sanitize_holes(hole_indices, coords.len() / 2);
    let outer_len = holes.first().map_or(coords.len(), |&h| h * 2);

    let mut polygon_area = signed_area(&coords, 0, outer_len).abs();
    for (k, &hole) in holes.iter().enumerate() {
        let start = hole * 2;
        let end = holes.get(k + 1).map_or(coords.len(), |&next| next * 2);
        polygon_area -= signed_area(&coords, start, end).abs();
    }

    let mut triangles_area = 0.0;
    for tri in triangles.chunks_exact(3) {
        let a = tri[0] as usize * 2;
        let b = tri[1] as usize * 2;
        let c = tri[2] as usize * 2;
        triangles_area += ((coords[a] - coords[c]) * (coords[b + 1] - coords[a + 1])
            - (coords[a] - coords[b]) * (coords[c + 1] - coords[a + 1]))
            .abs();
    }

    if polygon_area == 0.0 && triangles_area == 0.0 {
        0.0
    } else {
        ((triangles_area - polygon_area) / polygon_area).abs()
    }
}

fn widen(data: &[f32]) -> Vec<f64> {
    data[..data.len() & !1].iter().map(|&v| f64::from(v)).collect()
}

/// Keep strictly increasing hole starts that leave a non-empty outer ring
fn sanitize_holes(hole_indices: &[usize], vertex_count: usize) -> Vec<usize> {
    let mut holes = Vec::with_capacity(hole_indices.len());
    let mut last = 0;
    for &hole in hole_indices {
        if hole > last && hole < vertex_count {
            holes.push(hole);
            last = hole;
        }
    }
    if holes.len() != hole_indices.len() {
        tracing::debug!(
            given = hole_indices.len(),
            kept = holes.len(),
            "dropped out-of-range hole indices"
        );
    }
    holes
}

/// Twice the signed area of the ring `data[start..end]`
fn signed_area(data: &[f64], start: usize, end: usize) -> f64 {
    if end <= start {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut j = end - 2;
    let mut i = start;
    while i < end {
        sum += (data[j] - data[i]) * (data[i + 1] + data[j + 1]);
        j = i;
        i += 2;
    }
    sum
}

fn triangulate(data: &[f32], hole_indices: &[usize], allow_index: bool) -> Vec<u32> {
    let coords = widen(data);
    if coords.len() < 6 {
        return Vec::new();
    }
    let holes = sanitize_holes(hole_indices, coords.len() / 2);
    let outer_len = holes.first().map_or(coords.len(), |&h| h * 2);

    let mut ear = Earcut::with_capacity(coords.len() / 2 * 3 / 2 + 8);
    let Some(mut outer) = ear.linked_list(&coords, 0, outer_len, true) else {
        return Vec::new();
    };
    if ear.nodes[outer].next == ear.nodes[outer].prev {
        return Vec::new();
    }

    if !holes.is_empty() {
        outer = ear.eliminate_holes(&coords, &holes, outer);
    }

    if allow_index && coords.len() > HASH_THRESHOLD {
        let (mut min_x, mut min_y) = (coords[0], coords[1]);
        let (mut max_x, mut max_y) = (min_x, min_y);
        for pair in coords[..outer_len].chunks_exact(2) {
            min_x = min_x.min(pair[0]);
            min_y = min_y.min(pair[1]);
            max_x = max_x.max(pair[0]);
            max_y = max_y.max(pair[1]);
        }
        let size = (max_x - min_x).max(max_y - min_y);
        if size != 0.0 {
            ear.min_x = min_x;
            ear.min_y = min_y;
            ear.inv_size = 32767.0 / size;
            ear.hashed = true;
        }
    }

    ear.earcut_linked(Some(outer), 0, 0);
    ear.triangles
}

fn area(p: &Node, q: &Node, r: &Node) -> f64 {
    (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y)
}

#[allow(clippy::too_many_arguments)]
fn point_in_triangle(ax: f64, ay: f64, bx: f64, by: f64, cx: f64, cy: f64, px: f64, py: f64) -> bool {
    (cx - px) * (ay - py) >= (ax - px) * (cy - py)
        && (ax - px) * (by - py) >= (bx - px) * (ay - py)
        && (bx - px) * (cy - py) >= (cx - px) * (by - py)
}

fn on_segment(p: &Node, q: &Node, r: &Node) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

struct Earcut {
    nodes: Vec<Node>,
    triangles: Vec<u32>,
    hashed: bool,
    min_x: f64,
    min_y: f64,
    inv_size: f64,
}

impl Earcut {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            triangles: Vec::with_capacity(capacity * 3),
            hashed: false,
            min_x: 0.0,
            min_y: 0.0,
            inv_size: 0.0,
        }
    }

    fn area_of(&self, p: usize, q: usize, r: usize) -> f64 {
        area(&self.nodes[p], &self.nodes[q], &self.nodes[r])
    }

    fn equals(&self, a: usize, b: usize) -> bool {
        let (a, b) = (&self.nodes[a], &self.nodes[b]);
        a.x == b.x && a.y == b.y
    }

    fn insert_node(&mut self, i: u32, x: f64, y: f64, last: Option<usize>) -> usize {
        let idx = self.nodes.len();
        let mut node = Node::new(i, x, y);
        match last {
            None => {
                node.prev = idx;
                node.next = idx;
                self.nodes.push(node);
            }
            Some(last) => {
                let last_next = self.nodes[last].next;
                node.prev = last;
                node.next = last_next;
                self.nodes.push(node);
                self.nodes[last_next].prev = idx;
                self.nodes[last].next = idx;
            }
        }
        idx
    }

    /// Unlink `p`; its own links are left intact so callers can step off it
    fn remove_node(&mut self, p: usize) {
        let Node {
            prev,
            next,
            prev_z,
            next_z,
            ..
        } = self.nodes[p];
        self.nodes[next].prev = prev;
        self.nodes[prev].next = next;
        if let Some(pz) = prev_z {
            self.nodes[pz].next_z = next_z;
        }
        if let Some(nz) = next_z {
            self.nodes[nz].prev_z = prev_z;
        }
    }

    /// Link `data[start..end]` into a ring with the requested winding
    fn linked_list(&mut self, data: &[f64], start: usize, end: usize, clockwise: bool) -> Option<usize> {
        let mut last = None;
        if clockwise == (signed_area(data, start, end) > 0.0) {
            for i in (start..end).step_by(2) {
                last = Some(self.insert_node((i / 2) as u32, data[i], data[i + 1], last));
            }
        } else {
            for i in (start..end).step_by(2).rev() {
                last = Some(self.insert_node((i / 2) as u32, data[i], data[i + 1], last));
            }
        }

        if let Some(l) = last {
            let next = self.nodes[l].next;
            if self.equals(l, next) {
                self.remove_node(l);
                last = Some(next);
            }
        }
        last
    }

    /// Remove duplicate and collinear points between `start` and `end`
    fn filter_points(&mut self, start: usize, end: Option<usize>) -> usize {
        let mut end = end.unwrap_or(start);
        let mut p = start;
        loop {
            let mut again = false;
            let Node {
                prev, next, steiner, ..
            } = self.nodes[p];
            if !steiner && (self.equals(p, next) || self.area_of(prev, p, next) == 0.0) {
                self.remove_node(p);
                p = prev;
                end = prev;
                if p == self.nodes[p].next {
                    break;
                }
                again = true;
            } else {
                p = next;
            }
            if !again && p == end {
                break;
            }
        }
        end
    }

    fn earcut_linked(&mut self, ear: Option<usize>, pass: u8, depth: u32) {
        let Some(mut ear) = ear else {
            return;
        };
        if pass == 0 && self.hashed {
            self.index_curve(ear);
        }

        let mut stop = ear;
        while self.nodes[ear].prev != self.nodes[ear].next {
            let prev = self.nodes[ear].prev;
            let next = self.nodes[ear].next;

            let is_ear = if self.hashed {
                self.is_ear_hashed(ear)
            } else {
                self.is_ear(ear)
            };
            if is_ear {
                self.triangles
                    .extend([self.nodes[prev].i, self.nodes[ear].i, self.nodes[next].i]);
                self.remove_node(ear);
                ear = self.nodes[next].next;
                stop = ear;
                continue;
            }

            ear = next;
            if ear == stop {
                match pass {
                    0 => {
                        let filtered = self.filter_points(ear, None);
                        self.earcut_linked(Some(filtered), 1, depth);
                    }
                    1 => {
                        let filtered = self.filter_points(ear, None);
                        let cured = self.cure_local_intersections(filtered);
                        self.earcut_linked(Some(cured), 2, depth);
                    }
                    _ => self.split_earcut(ear, depth),
                }
                break;
            }
        }
    }

    fn is_ear(&self, ear: usize) -> bool {
        let b = self.nodes[ear];
        let a_idx = b.prev;
        let a = self.nodes[a_idx];
        let c = self.nodes[b.next];
        if area(&a, &b, &c) >= 0.0 {
            return false;
        }

        let (x0, x1) = (a.x.min(b.x).min(c.x), a.x.max(b.x).max(c.x));
        let (y0, y1) = (a.y.min(b.y).min(c.y), a.y.max(b.y).max(c.y));

        let mut p = c.next;
        while p != a_idx {
            let n = &self.nodes[p];
            if n.x >= x0
                && n.x <= x1
                && n.y >= y0
                && n.y <= y1
                && point_in_triangle(a.x, a.y, b.x, b.y, c.x, c.y, n.x, n.y)
                && self.area_of(n.prev, p, n.next) >= 0.0
            {
                return false;
            }
            p = n.next;
        }
        true
    }

    fn is_ear_hashed(&self, ear: usize) -> bool {
        let b = self.nodes[ear];
        let (a_idx, c_idx) = (b.prev, b.next);
        let a = self.nodes[a_idx];
        let c = self.nodes[c_idx];
        if area(&a, &b, &c) >= 0.0 {
            return false;
        }

        let (x0, x1) = (a.x.min(b.x).min(c.x), a.x.max(b.x).max(c.x));
        let (y0, y1) = (a.y.min(b.y).min(c.y), a.y.max(b.y).max(c.y));
        let min_z = self.z_order(x0, y0);
        let max_z = self.z_order(x1, y1);

        let blocks = |idx: usize| {
            let n = &self.nodes[idx];
            idx != a_idx
                && idx != c_idx
                && n.x >= x0
                && n.x <= x1
                && n.y >= y0
                && n.y <= y1
                && point_in_triangle(a.x, a.y, b.x, b.y, c.x, c.y, n.x, n.y)
                && self.area_of(n.prev, idx, n.next) >= 0.0
        };

        let mut p = b.prev_z;
        let mut n = b.next_z;

        // Walk both directions at once while each stays in range
        while let (Some(pi), Some(ni)) = (p, n) {
            if self.nodes[pi].z < min_z || self.nodes[ni].z > max_z {
                break;
            }
            if blocks(pi) {
                return false;
            }
            p = self.nodes[pi].prev_z;
            if blocks(ni) {
                return false;
            }
            n = self.nodes[ni].next_z;
        }

        while let Some(pi) = p {
            if self.nodes[pi].z < min_z {
                break;
            }
            if blocks(pi) {
                return false;
            }
            p = self.nodes[pi].prev_z;
        }

        while let Some(ni) = n {
            if self.nodes[ni].z > max_z {
                break;
            }
            if blocks(ni) {
                return false;
            }
            n = self.nodes[ni].next_z;
        }
        true
    }

    /// Clip triangles across small self-intersections (`a-p` crossing `p.next-b`)
    fn cure_local_intersections(&mut self, start: usize) -> usize {
        let mut start = start;
        let mut p = start;
        loop {
            let a = self.nodes[p].prev;
            let p_next = self.nodes[p].next;
            let b = self.nodes[p_next].next;

            if !self.equals(a, b)
                && self.intersects(a, p, p_next, b)
                && self.locally_inside(a, b)
                && self.locally_inside(b, a)
            {
                self.triangles
                    .extend([self.nodes[a].i, self.nodes[p].i, self.nodes[b].i]);
                self.remove_node(p);
                self.remove_node(p_next);
                p = b;
                start = b;
            }
            p = self.nodes[p].next;
            if p == start {
                break;
            }
        }
        self.filter_points(p, None)
    }

    /// Last resort: cut the ring along a valid diagonal and recurse on both halves
    fn split_earcut(&mut self, start: usize, depth: u32) {
        if depth >= MAX_SPLIT_DEPTH {
            tracing::debug!(depth, "ear clipping split depth exhausted; ring left partly untriangulated");
            return;
        }

        let mut a = start;
        loop {
            let mut b = self.nodes[self.nodes[a].next].next;
            while b != self.nodes[a].prev {
                if self.nodes[a].i != self.nodes[b].i && self.is_valid_diagonal(a, b) {
                    let c = self.split_polygon(a, b);
                    let a_next = self.nodes[a].next;
                    let a = self.filter_points(a, Some(a_next));
                    let c_next = self.nodes[c].next;
                    let c = self.filter_points(c, Some(c_next));
                    self.earcut_linked(Some(a), 0, depth + 1);
                    self.earcut_linked(Some(c), 0, depth + 1);
                    return;
                }
                b = self.nodes[b].next;
            }
            a = self.nodes[a].next;
            if a == start {
                break;
            }
        }
    }

    fn eliminate_holes(&mut self, data: &[f64], holes: &[usize], outer: usize) -> usize {
        let mut queue = Vec::with_capacity(holes.len());
        for (k, &hole) in holes.iter().enumerate() {
            let start = hole * 2;
            let end = holes.get(k + 1).map_or(data.len(), |&next| next * 2);
            if let Some(list) = self.linked_list(data, start, end, false) {
                if list == self.nodes[list].next {
                    self.nodes[list].steiner = true;
                }
                queue.push(self.leftmost(list));
            }
        }
        queue.sort_by(|&a, &b| self.nodes[a].x.total_cmp(&self.nodes[b].x));

        let mut outer = outer;
        for hole in queue {
            outer = self.eliminate_hole(hole, outer);
        }
        outer
    }

    fn eliminate_hole(&mut self, hole: usize, outer: usize) -> usize {
        let Some(bridge) = self.find_hole_bridge(hole, outer) else {
            tracing::trace!("no bridge found for hole; dropping it");
            return outer;
        };

        let bridge_reverse = self.split_polygon(bridge, hole);
        let reverse_next = self.nodes[bridge_reverse].next;
        self.filter_points(bridge_reverse, Some(reverse_next));
        let bridge_next = self.nodes[bridge].next;
        self.filter_points(bridge, Some(bridge_next))
    }

    /// Outer-ring vertex to connect the hole's leftmost point to
    fn find_hole_bridge(&self, hole: usize, outer: usize) -> Option<usize> {
        let (hx, hy) = (self.nodes[hole].x, self.nodes[hole].y);
        let mut qx = f64::NEG_INFINITY;
        let mut m = None;

        // Nearest segment crossed by a ray cast left from the hole point
        let mut p = outer;
        loop {
            let pn = &self.nodes[p];
            let nn = &self.nodes[pn.next];
            if hy <= pn.y && hy >= nn.y && nn.y != pn.y {
                let x = pn.x + (hy - pn.y) * (nn.x - pn.x) / (nn.y - pn.y);
                if x <= hx && x > qx {
                    qx = x;
                    let candidate = if pn.x < nn.x { p } else { pn.next };
                    if x == hx {
                        // The hole touches the segment
                        return Some(candidate);
                    }
                    m = Some(candidate);
                }
            }
            p = pn.next;
            if p == outer {
                break;
            }
        }

        let mut m = m?;
        let stop = m;
        let (mx, my) = (self.nodes[m].x, self.nodes[m].y);
        let mut tan_min = f64::INFINITY;

        // Prefer a reflex vertex inside the ray triangle with the smallest angle
        p = m;
        loop {
            let node = self.nodes[p];
            let (tx0, tx1) = if hy < my { (hx, qx) } else { (qx, hx) };
            if hx >= node.x
                && node.x >= mx
                && hx != node.x
                && point_in_triangle(tx0, hy, mx, my, tx1, hy, node.x, node.y)
            {
                let tan = (hy - node.y).abs() / (hx - node.x);
                let current = self.nodes[m];
                if self.locally_inside(p, hole)
                    && (tan < tan_min
                        || (tan == tan_min
                            && (node.x > current.x
                                || (node.x == current.x && self.sector_contains_sector(m, p)))))
                {
                    m = p;
                    tan_min = tan;
                }
            }
            p = node.next;
            if p == stop {
                break;
            }
        }
        Some(m)
    }

    /// Bridge tie-break: whether the sector at `m` contains the sector at `p`
    fn sector_contains_sector(&self, m: usize, p: usize) -> bool {
        let (mp, mn) = (self.nodes[m].prev, self.nodes[m].next);
        let (pp, pn) = (self.nodes[p].prev, self.nodes[p].next);
        self.area_of(mp, m, pp) < 0.0 && self.area_of(pn, m, mn) < 0.0
    }

    fn index_curve(&mut self, start: usize) {
        let mut p = start;
        loop {
            if self.nodes[p].z == 0 {
                self.nodes[p].z = self.z_order(self.nodes[p].x, self.nodes[p].y);
            }
            self.nodes[p].prev_z = Some(self.nodes[p].prev);
            self.nodes[p].next_z = Some(self.nodes[p].next);
            p = self.nodes[p].next;
            if p == start {
                break;
            }
        }

        if let Some(pz) = self.nodes[p].prev_z {
            self.nodes[pz].next_z = None;
        }
        self.nodes[p].prev_z = None;
        self.sort_linked(p);
    }

    /// Bottom-up merge sort of the z list
    fn sort_linked(&mut self, list: usize) {
        let mut list = Some(list);
        let mut in_size = 1;
        loop {
            let mut p = list;
            list = None;
            let mut tail: Option<usize> = None;
            let mut num_merges = 0;

            while p.is_some() {
                num_merges += 1;
                let mut q = p;
                let mut p_size = 0;
                for _ in 0..in_size {
                    p_size += 1;
                    q = q.and_then(|qi| self.nodes[qi].next_z);
                    if q.is_none() {
                        break;
                    }
                }
                let mut q_size = in_size;

                while p_size > 0 || (q_size > 0 && q.is_some()) {
                    let take_p = p_size != 0
                        && match (p, q) {
                            (Some(pi), Some(qi)) => q_size == 0 || self.nodes[pi].z <= self.nodes[qi].z,
                            (_, None) => true,
                            (None, Some(_)) => false,
                        };
                    let e = if take_p {
                        let e = p;
                        p = e.and_then(|i| self.nodes[i].next_z);
                        p_size -= 1;
                        e
                    } else {
                        let e = q;
                        q = e.and_then(|i| self.nodes[i].next_z);
                        q_size -= 1;
                        e
                    };
                    let Some(e) = e else {
                        break;
                    };

                    match tail {
                        Some(t) => self.nodes[t].next_z = Some(e),
                        None => list = Some(e),
                    }
                    self.nodes[e].prev_z = tail;
                    tail = Some(e);
                }
                p = q;
            }

            if let Some(t) = tail {
                self.nodes[t].next_z = None;
            }
            in_size *= 2;
            if num_merges <= 1 {
                break;
            }
        }
    }

    /// Morton code of a point scaled into 15-bit integer coordinates
    fn z_order(&self, x: f64, y: f64) -> i32 {
        let mut x = ((x - self.min_x) * self.inv_size) as i32;
        let mut y = ((y - self.min_y) * self.inv_size) as i32;

        x = (x | (x << 8)) & 0x00FF_00FF;
        x = (x | (x << 4)) & 0x0F0F_0F0F;
        x = (x | (x << 2)) & 0x3333_3333;
        x = (x | (x << 1)) & 0x5555_5555;

        y = (y | (y << 8)) & 0x00FF_00FF;
        y = (y | (y << 4)) & 0x0F0F_0F0F;
        y = (y | (y << 2)) & 0x3333_3333;
        y = (y | (y << 1)) & 0x5555_5555;

        x | (y << 1)
    }

    fn leftmost(&self, start: usize) -> usize {
        let mut p = start;
        let mut leftmost = start;
        loop {
            let (n, l) = (&self.nodes[p], &self.nodes[leftmost]);
            if n.x < l.x || (n.x == l.x && n.y < l.y) {
                leftmost = p;
            }
            p = n.next;
            if p == start {
                break;
            }
        }
        leftmost
    }

    fn is_valid_diagonal(&self, a: usize, b: usize) -> bool {
        let (na, nb) = (self.nodes[a], self.nodes[b]);
        if self.nodes[na.next].i == nb.i
            || self.nodes[na.prev].i == nb.i
            || self.intersects_polygon(a, b)
        {
            return false;
        }

        let open = self.locally_inside(a, b)
            && self.locally_inside(b, a)
            && self.middle_inside(a, b)
            && (self.area_of(na.prev, a, nb.prev) != 0.0 || self.area_of(a, nb.prev, b) != 0.0);
        let touching = self.equals(a, b)
            && self.area_of(na.prev, a, na.next) > 0.0
            && self.area_of(nb.prev, b, nb.next) > 0.0;
        open || touching
    }

    fn intersects(&self, p1: usize, q1: usize, p2: usize, q2: usize) -> bool {
        let (p1, q1, p2, q2) = (&self.nodes[p1], &self.nodes[q1], &self.nodes[p2], &self.nodes[q2]);
        let o1 = sign(area(p1, q1, p2));
        let o2 = sign(area(p1, q1, q2));
        let o3 = sign(area(p2, q2, p1));
        let o4 = sign(area(p2, q2, q1));

        if o1 != o2 && o3 != o4 {
            return true;
        }
        (o1 == 0 && on_segment(p1, p2, q1))
            || (o2 == 0 && on_segment(p1, q2, q1))
            || (o3 == 0 && on_segment(p2, p1, q2))
            || (o4 == 0 && on_segment(p2, q1, q2))
    }

    fn intersects_polygon(&self, a: usize, b: usize) -> bool {
        let (ai, bi) = (self.nodes[a].i, self.nodes[b].i);
        let mut p = a;
        loop {
            let node = self.nodes[p];
            let next_i = self.nodes[node.next].i;
            if node.i != ai
                && next_i != ai
                && node.i != bi
                && next_i != bi
                && self.intersects(p, node.next, a, b)
            {
                return true;
            }
            p = node.next;
            if p == a {
                break;
            }
        }
        false
    }

    fn locally_inside(&self, a: usize, b: usize) -> bool {
        let (prev, next) = (self.nodes[a].prev, self.nodes[a].next);
        if self.area_of(prev, a, next) < 0.0 {
            self.area_of(a, b, next) >= 0.0 && self.area_of(a, prev, b) >= 0.0
        } else {
            self.area_of(a, b, prev) < 0.0 || self.area_of(a, next, b) < 0.0
        }
    }

    /// Whether the midpoint of the diagonal `a-b` lies inside the ring
    fn middle_inside(&self, a: usize, b: usize) -> bool {
        let px = (self.nodes[a].x + self.nodes[b].x) / 2.0;
        let py = (self.nodes[a].y + self.nodes[b].y) / 2.0;
        let mut inside = false;
        let mut p = a;
        loop {
            let n = &self.nodes[p];
            let nn = &self.nodes[n.next];
            if (n.y > py) != (nn.y > py)
                && nn.y != n.y
                && px < (nn.x - n.x) * (py - n.y) / (nn.y - n.y) + n.x
            {
                inside = !inside;
            }
            p = n.next;
            if p == a {
                break;
            }
        }
        inside
    }

    /// Link `a` to `b` with a double edge, splitting the ring in two
    ///
    /// Returns the copy of `b` heading the second ring.
    fn split_polygon(&mut self, a: usize, b: usize) -> usize {
        let (na, nb) = (self.nodes[a], self.nodes[b]);
        let a2 = self.nodes.len();
        self.nodes.push(Node::new(na.i, na.x, na.y));
        let b2 = self.nodes.len();
        self.nodes.push(Node::new(nb.i, nb.x, nb.y));

        let an = na.next;
        let bp = nb.prev;

        self.nodes[a].next = b;
        self.nodes[b].prev = a;

        self.nodes[a2].next = an;
        self.nodes[an].prev = a2;

        self.nodes[b2].next = a2;
        self.nodes[a2].prev = b2;

        self.nodes[bp].next = b2;
        self.nodes[b2].prev = bp;

        b2
    }
}
