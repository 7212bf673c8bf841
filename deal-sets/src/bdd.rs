//! Shared ROBDD node store with complement edges.
//!
//! Handles are signed: negation of a handle is logical complement, so NOT
//! is free and function equality is handle equality. Canonical form keeps
//! the then-edge positive; any complement there is pushed up to the parent.
//!
//! One store serves the whole process, guarded by a mutex. Hand predicates
//! live over variables 0..52 (card indices) and deal predicates over
//! 0..104 (owner-bit pairs), so the variable domain is a parameter of the
//! counting operations, not of the store.

use rustc_hash::FxHashMap;
use std::sync::{Mutex, OnceLock};

/// Number of variables in the hand domain (one per card).
pub const HAND_VARS: u32 = 52;

/// Number of variables in the deal domain (two owner bits per card).
pub const DEAL_VARS: u32 = 104;

const TRUE_ID: i32 = i32::MAX;

/// A boolean function over the global variable order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bdd(i32);

impl Bdd {
    pub const TRUE: Bdd = Bdd(TRUE_ID);
    pub const FALSE: Bdd = Bdd(-TRUE_ID);

    /// The function "variable `var` is true".
    pub fn var(var: u32) -> Bdd {
        with_store(|s| s.mk(var, Bdd::TRUE, Bdd::FALSE))
    }

    #[inline]
    fn is_terminal(self) -> bool {
        self.0.unsigned_abs() == TRUE_ID as u32
    }

    #[inline]
    fn is_complement(self) -> bool {
        self.0 < 0
    }

    #[inline]
    fn node_index(self) -> usize {
        self.0.unsigned_abs() as usize
    }

    pub fn ite(self, t: Bdd, e: Bdd) -> Bdd {
        with_store(|s| s.ite(self, t, e))
    }

    /// Satisfying assignments over the first `nvars` variables.
    pub fn count(self, nvars: u32) -> u128 {
        with_store(|s| s.count(self, nvars))
    }

    /// The `k`-th satisfying assignment in lexicographic variable order,
    /// returned as the sorted list of true variables. `k` must be below
    /// `count(nvars)`.
    pub fn nth_model(self, k: u128, nvars: u32) -> Vec<u32> {
        with_store(|s| s.nth_model(self, k, nvars))
    }

    /// Evaluate under an assignment.
    pub fn eval(self, assign: impl FnMut(u32) -> bool) -> bool {
        with_store(|s| s.eval(self, assign))
    }

    /// Number of distinct nodes reachable from this handle.
    pub fn size(self) -> usize {
        with_store(|s| s.size(self))
    }
}

impl std::ops::Not for Bdd {
    type Output = Bdd;

    #[inline]
    fn not(self) -> Bdd {
        Bdd(-self.0)
    }
}

impl std::ops::BitAnd for Bdd {
    type Output = Bdd;

    fn bitand(self, other: Bdd) -> Bdd {
        self.ite(other, Bdd::FALSE)
    }
}

impl std::ops::BitOr for Bdd {
    type Output = Bdd;

    fn bitor(self, other: Bdd) -> Bdd {
        self.ite(Bdd::TRUE, other)
    }
}

impl std::ops::BitXor for Bdd {
    type Output = Bdd;

    fn bitxor(self, other: Bdd) -> Bdd {
        self.ite(!other, other)
    }
}

impl std::ops::Sub for Bdd {
    type Output = Bdd;

    fn sub(self, other: Bdd) -> Bdd {
        other.ite(Bdd::FALSE, self)
    }
}

impl std::fmt::Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == Bdd::TRUE {
            write!(f, "Bdd(T)")
        } else if *self == Bdd::FALSE {
            write!(f, "Bdd(F)")
        } else {
            write!(f, "Bdd({})", self.0)
        }
    }
}

#[derive(Clone, Copy)]
struct Node {
    var: u32,
    hi: Bdd,
    lo: Bdd,
}

/// The node table. Nodes are appended, never moved or freed; handles
/// stay valid for the process lifetime.
pub struct BddStore {
    nodes: Vec<Node>,
    unique: FxHashMap<(u32, i32, i32), i32>,
    ite_cache: FxHashMap<(i32, i32, i32), i32>,
}

static STORE: OnceLock<Mutex<BddStore>> = OnceLock::new();

/// Run an operation against the process-wide store.
///
/// The table is append-only and every cached value is final, so a
/// panic inside an operation cannot leave it inconsistent; a poisoned
/// lock is therefore safe to keep using.
pub fn with_store<R>(f: impl FnOnce(&mut BddStore) -> R) -> R {
    let store = STORE.get_or_init(|| Mutex::new(BddStore::new()));
    let mut guard = store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}

impl BddStore {
    fn new() -> Self {
        BddStore {
            // Index 0 is unused so node indices are never ambiguous with sign.
            nodes: vec![Node {
                var: u32::MAX,
                hi: Bdd::TRUE,
                lo: Bdd::TRUE,
            }],
            unique: FxHashMap::default(),
            ite_cache: FxHashMap::default(),
        }
    }

    #[inline]
    fn node(&self, f: Bdd) -> Node {
        self.nodes[f.node_index()]
    }

    #[inline]
    fn top_var(&self, f: Bdd) -> u32 {
        if f.is_terminal() {
            u32::MAX
        } else {
            self.nodes[f.node_index()].var
        }
    }

    /// Branches of `f` at variable `var`, with complement pushed through.
    /// `var` must not exceed the top variable of `f`.
    #[inline]
    fn branches_at(&self, f: Bdd, var: u32) -> (Bdd, Bdd) {
        if self.top_var(f) != var {
            return (f, f);
        }
        let node = self.node(f);
        if f.is_complement() {
            (!node.hi, !node.lo)
        } else {
            (node.hi, node.lo)
        }
    }

    /// Top variable and branches with complement pushed through, or
    /// `None` for a terminal.
    pub(crate) fn expand(&self, f: Bdd) -> Option<(u32, Bdd, Bdd)> {
        if f.is_terminal() {
            return None;
        }
        let node = self.node(f);
        if f.is_complement() {
            Some((node.var, !node.hi, !node.lo))
        } else {
            Some((node.var, node.hi, node.lo))
        }
    }

    /// Canonical node constructor.
    pub fn mk(&mut self, var: u32, hi: Bdd, lo: Bdd) -> Bdd {
        if hi == lo {
            return hi;
        }
        assert!(
            var < self.top_var(hi) && var < self.top_var(lo),
            "mk: variable {} not above children",
            var
        );
        if hi.is_complement() {
            return !self.mk_raw(var, !hi, !lo);
        }
        self.mk_raw(var, hi, lo)
    }

    fn mk_raw(&mut self, var: u32, hi: Bdd, lo: Bdd) -> Bdd {
        let key = (var, hi.0, lo.0);
        if let Some(&id) = self.unique.get(&key) {
            return Bdd(id);
        }
        let id = self.nodes.len();
        assert!(id < TRUE_ID as usize, "BDD store exhausted");
        self.nodes.push(Node { var, hi, lo });
        self.unique.insert(key, id as i32);
        if id % (1 << 20) == 0 {
            log::debug!("bdd store grew to {} nodes", id);
        }
        Bdd(id as i32)
    }

    /// If-then-else with Shannon expansion on the minimum top variable.
    pub fn ite(&mut self, i: Bdd, t: Bdd, e: Bdd) -> Bdd {
        if i == Bdd::TRUE {
            return t;
        }
        if i == Bdd::FALSE {
            return e;
        }

        let (i, t, e) = if i.is_complement() { (!i, e, t) } else { (i, t, e) };

        let t = if t == i {
            Bdd::TRUE
        } else if t == !i {
            Bdd::FALSE
        } else {
            t
        };
        let e = if e == i {
            Bdd::FALSE
        } else if e == !i {
            Bdd::TRUE
        } else {
            e
        };

        if t == e {
            return t;
        }
        if t == Bdd::TRUE && e == Bdd::FALSE {
            return i;
        }
        if t == Bdd::FALSE && e == Bdd::TRUE {
            return !i;
        }

        let key = (i.0, t.0, e.0);
        if let Some(&id) = self.ite_cache.get(&key) {
            return Bdd(id);
        }
        // Complement twin: ite(i, ~t, ~e) is the complement of ite(i, t, e).
        let twin = (i.0, (!t).0, (!e).0);
        if let Some(&id) = self.ite_cache.get(&twin) {
            return !Bdd(id);
        }

        let var = self
            .top_var(i)
            .min(self.top_var(t))
            .min(self.top_var(e));

        let (i_hi, i_lo) = self.branches_at(i, var);
        let (t_hi, t_lo) = self.branches_at(t, var);
        let (e_hi, e_lo) = self.branches_at(e, var);

        let hi = self.ite(i_hi, t_hi, e_hi);
        let lo = self.ite(i_lo, t_lo, e_lo);
        let out = self.mk(var, hi, lo);

        self.ite_cache.insert(key, out.0);
        out
    }

    /// Satisfying assignments of `f` over variables `[0, nvars)`.
    pub fn count(&self, f: Bdd, nvars: u32) -> u128 {
        let mut memo = FxHashMap::default();
        self.count_at(f, 0, nvars, &mut memo)
    }

    fn count_at(
        &self,
        f: Bdd,
        level: u32,
        nvars: u32,
        memo: &mut FxHashMap<u32, u128>,
    ) -> u128 {
        if f == Bdd::FALSE {
            return 0;
        }
        if f == Bdd::TRUE {
            return 1u128 << (nvars - level);
        }
        if f.is_complement() {
            return (1u128 << (nvars - level)) - self.count_at(!f, level, nvars, memo);
        }
        let node = self.node(f);
        debug_assert!(node.var >= level && node.var < nvars);
        let id = f.node_index() as u32;
        let at_var = match memo.get(&id) {
            Some(&m) => m,
            None => {
                let m = self.count_at(node.hi, node.var + 1, nvars, memo)
                    + self.count_at(node.lo, node.var + 1, nvars, memo);
                memo.insert(id, m);
                m
            }
        };
        at_var << (node.var - level)
    }

    /// The `k`-th satisfying assignment, lexicographic by variable with
    /// false before true. Panics when `k` is out of range.
    pub fn nth_model(&self, f: Bdd, k: u128, nvars: u32) -> Vec<u32> {
        let mut memo = FxHashMap::default();
        let total = self.count_at(f, 0, nvars, &mut memo);
        assert!(k < total, "model index {} out of range (count {})", k, total);

        let mut out = Vec::new();
        let mut cur = f;
        let mut k = k;
        for level in 0..nvars {
            let (hi, lo) = self.branches_at(cur, level);
            let lo_count = self.count_at(lo, level + 1, nvars, &mut memo);
            if k < lo_count {
                cur = lo;
            } else {
                k -= lo_count;
                out.push(level);
                cur = hi;
            }
        }
        debug_assert!(cur == Bdd::TRUE && k == 0);
        out
    }

    /// Evaluate under an assignment of every variable.
    pub fn eval(&self, f: Bdd, mut assign: impl FnMut(u32) -> bool) -> bool {
        let mut cur = f;
        let mut flip = false;
        loop {
            if cur == Bdd::TRUE {
                return !flip;
            }
            if cur == Bdd::FALSE {
                return flip;
            }
            if cur.is_complement() {
                flip = !flip;
                cur = !cur;
            }
            let node = self.node(cur);
            cur = if assign(node.var) { node.hi } else { node.lo };
        }
    }

    /// Distinct nodes reachable from `f`.
    pub fn size(&self, f: Bdd) -> usize {
        fn visit(store: &BddStore, f: Bdd, seen: &mut FxHashMap<u32, ()>) -> usize {
            if f.is_terminal() {
                return 0;
            }
            let id = f.node_index() as u32;
            if seen.insert(id, ()).is_some() {
                return 0;
            }
            let node = store.node(f);
            1 + visit(store, node.hi, seen) + visit(store, node.lo, seen)
        }
        let mut seen = FxHashMap::default();
        visit(self, f, &mut seen)
    }

    /// Total nodes ever allocated.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }
}
