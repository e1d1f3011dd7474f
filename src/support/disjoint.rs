/// Array-backed union-find over `usize` elements.
///
/// Elements are `0..len()`. Lookups outside that range fail instead of
/// growing the structure; use [`Disjoint::add`] or [`Disjoint::grow`].
#[derive(Debug, Clone, Default)]
pub struct Disjoint {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl Disjoint {
    /// Creates `n` singleton sets `0..n`.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Adds a new singleton set and returns its element.
    pub fn add(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        self.rank.push(0);
        id
    }

    /// Adds singleton sets until there are at least `n` elements.
    pub fn grow(&mut self, n: usize) {
        while self.parent.len() < n {
            self.add();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Returns the representative of `x`'s set, compressing the path.
    /// `None` if `x` is not an element.
    pub fn find(&mut self, x: usize) -> Option<usize> {
        if x >= self.parent.len() {
            return None;
        }
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        Some(root)
    }

    /// Unions the sets of `a` and `b`. Returns `false` if they were
    /// already the same set or either is not an element.
    pub fn merge(&mut self, a: usize, b: usize) -> bool {
        let (Some(ra), Some(rb)) = (self.find(a), self.find(b)) else {
            return false;
        };
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        true
    }

    pub fn same(&mut self, a: usize, b: usize) -> bool {
        match (self.find(a), self.find(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.parent.clear();
        self.rank.clear();
    }
}
