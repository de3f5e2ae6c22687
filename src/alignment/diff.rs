//! Minimal edit script between two sequences (Myers O(ND) diff, linear
//! space variant).
//!
//! Each subproblem first matches its common prefix and suffix, so among
//! minimal scripts the one matching the longest common prefix wins. What is
//! left is split at a middle snake and solved recursively, which keeps
//! memory at O(N + M) however far apart the sequences are. The result is
//! grouped into runs where every non-equal block between two equal runs
//! lists its deletions before its insertions.

use std::ops::{Index, IndexMut, Range};

/// One step of an edit script. Indices point into the compared slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Equal { old: usize, new: usize },
    Delete { old: usize },
    Insert { new: usize },
}

/// Maximal run of one kind of edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
    Equal(Vec<(usize, usize)>),
    Deleted(Vec<usize>),
    Inserted(Vec<usize>),
}

pub fn diff<T: PartialEq>(old: &[T], new: &[T]) -> Vec<Edit> {
    let max_d = max_d(old.len(), new.len());
    let mut forward = Frontier::new(max_d);
    let mut backward = Frontier::new(max_d);
    let mut edits = Vec::with_capacity(old.len().max(new.len()));
    conquer(
        old,
        0..old.len(),
        new,
        0..new.len(),
        &mut forward,
        &mut backward,
        &mut edits,
    );
    edits
}

/// Groups an edit script into runs. Within each stretch between equal runs,
/// deletions come out first and insertions second, each in source order.
pub fn into_runs(edits: &[Edit]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut equal = Vec::new();
    let mut deleted = Vec::new();
    let mut inserted = Vec::new();

    for edit in edits {
        match *edit {
            Edit::Equal { old, new } => {
                flush_changes(&mut runs, &mut deleted, &mut inserted);
                equal.push((old, new));
            }
            Edit::Delete { old } => {
                flush_equal(&mut runs, &mut equal);
                deleted.push(old);
            }
            Edit::Insert { new } => {
                flush_equal(&mut runs, &mut equal);
                inserted.push(new);
            }
        }
    }
    flush_equal(&mut runs, &mut equal);
    flush_changes(&mut runs, &mut deleted, &mut inserted);
    runs
}

fn flush_equal(runs: &mut Vec<Run>, equal: &mut Vec<(usize, usize)>) {
    if !equal.is_empty() {
        runs.push(Run::Equal(std::mem::take(equal)));
    }
}

fn flush_changes(runs: &mut Vec<Run>, deleted: &mut Vec<usize>, inserted: &mut Vec<usize>) {
    if !deleted.is_empty() {
        runs.push(Run::Deleted(std::mem::take(deleted)));
    }
    if !inserted.is_empty() {
        runs.push(Run::Inserted(std::mem::take(inserted)));
    }
}

/// Furthest x reached on each diagonal `k = x - y`, for `k` in `-max..=max`.
struct Frontier {
    reach: Vec<isize>,
    offset: isize,
}

impl Frontier {
    fn new(max_d: usize) -> Self {
        Self {
            reach: vec![0; 2 * max_d + 2],
            offset: max_d as isize,
        }
    }
}

impl Index<isize> for Frontier {
    type Output = isize;

    fn index(&self, k: isize) -> &isize {
        &self.reach[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for Frontier {
    fn index_mut(&mut self, k: isize) -> &mut isize {
        &mut self.reach[(k + self.offset) as usize]
    }
}

fn max_d(old_len: usize, new_len: usize) -> usize {
    (old_len + new_len + 1) / 2 + 1
}

fn conquer<T: PartialEq>(
    old: &[T],
    mut old_range: Range<usize>,
    new: &[T],
    mut new_range: Range<usize>,
    forward: &mut Frontier,
    backward: &mut Frontier,
    edits: &mut Vec<Edit>,
) {
    let prefix = common_prefix_len(&old[old_range.clone()], &new[new_range.clone()]);
    edits.extend((0..prefix).map(|i| Edit::Equal {
        old: old_range.start + i,
        new: new_range.start + i,
    }));
    old_range.start += prefix;
    new_range.start += prefix;

    let suffix = common_suffix_len(&old[old_range.clone()], &new[new_range.clone()]);
    old_range.end -= suffix;
    new_range.end -= suffix;
    let (old_tail, new_tail) = (old_range.end, new_range.end);

    if old_range.is_empty() {
        edits.extend(new_range.map(|new| Edit::Insert { new }));
    } else if new_range.is_empty() {
        edits.extend(old_range.map(|old| Edit::Delete { old }));
    } else if let Some((x, y)) = middle_snake(
        old,
        old_range.clone(),
        new,
        new_range.clone(),
        forward,
        backward,
    ) {
        conquer(
            old,
            old_range.start..x,
            new,
            new_range.start..y,
            forward,
            backward,
            edits,
        );
        conquer(
            old,
            x..old_range.end,
            new,
            y..new_range.end,
            forward,
            backward,
            edits,
        );
    } else {
        edits.extend(old_range.map(|old| Edit::Delete { old }));
        edits.extend(new_range.map(|new| Edit::Insert { new }));
    }

    edits.extend((0..suffix).map(|i| Edit::Equal {
        old: old_tail + i,
        new: new_tail + i,
    }));
}

/// Runs the forward and backward searches until they overlap and returns
/// a point on a minimal path, in absolute indices. Both ranges are
/// non-empty and share no prefix or suffix, so the point always splits the
/// problem into two strictly smaller ones.
fn middle_snake<T: PartialEq>(
    old: &[T],
    old_range: Range<usize>,
    new: &[T],
    new_range: Range<usize>,
    forward: &mut Frontier,
    backward: &mut Frontier,
) -> Option<(usize, usize)> {
    let n = old_range.len() as isize;
    let m = new_range.len() as isize;
    let delta = n - m;
    let odd = delta & 1 == 1;
    let old_at = |x: isize| &old[old_range.start + x as usize];
    let new_at = |y: isize| &new[new_range.start + y as usize];
    let old_back = |x: isize| &old[old_range.end - 1 - x as usize];
    let new_back = |y: isize| &new[new_range.end - 1 - y as usize];

    forward[1] = 0;
    backward[1] = 0;

    for d in 0..max_d(old_range.len(), new_range.len()) as isize {
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && forward[k - 1] < forward[k + 1]) {
                forward[k + 1]
            } else {
                forward[k - 1] + 1
            };
            let mut y = x - k;
            let (x0, y0) = (x, y);
            while x < n && y < m && old_at(x) == new_at(y) {
                x += 1;
                y += 1;
            }
            forward[k] = x;
            if odd && (k - delta).abs() < d && forward[k] + backward[-(k - delta)] >= n {
                return Some((
                    old_range.start + x0 as usize,
                    new_range.start + y0 as usize,
                ));
            }
        }

        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && backward[k - 1] < backward[k + 1]) {
                backward[k + 1]
            } else {
                backward[k - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && old_back(x) == new_back(y) {
                x += 1;
                y += 1;
            }
            backward[k] = x;
            if !odd && (k - delta).abs() <= d && backward[k] + forward[-(k - delta)] >= n {
                return Some((
                    old_range.start + (n - x) as usize,
                    new_range.start + (m - y) as usize,
                ));
            }
        }
    }
    None
}

fn common_prefix_len<T: PartialEq>(old: &[T], new: &[T]) -> usize {
    old.iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count()
}

fn common_suffix_len<T: PartialEq>(old: &[T], new: &[T]) -> usize {
    old.iter()
        .rev()
        .zip(new.iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit_distance(edits: &[Edit]) -> usize {
        edits
            .iter()
            .filter(|e| !matches!(e, Edit::Equal { .. }))
            .count()
    }

    fn replay<'a>(
        old: &[&'a str],
        new: &[&'a str],
        edits: &[Edit],
    ) -> (Vec<&'a str>, Vec<&'a str>) {
        let mut rebuilt_old = Vec::new();
        let mut rebuilt_new = Vec::new();
        for edit in edits {
            match *edit {
                Edit::Equal { old: i, new: j } => {
                    assert_eq!(old[i], new[j]);
                    rebuilt_old.push(old[i]);
                    rebuilt_new.push(new[j]);
                }
                Edit::Delete { old: i } => rebuilt_old.push(old[i]),
                Edit::Insert { new: j } => rebuilt_new.push(new[j]),
            }
        }
        (rebuilt_old, rebuilt_new)
    }

    #[test]
    fn identical_sequences_are_all_equal() {
        let a = ["x", "y", "z"];
        let edits = diff(&a, &a);
        assert_eq!(edits.len(), 3);
        assert_eq!(edit_distance(&edits), 0);
    }

    #[test]
    fn empty_sides() {
        let a: [&str; 0] = [];
        let b = ["p", "q"];
        assert_eq!(
            diff(&a, &b),
            vec![Edit::Insert { new: 0 }, Edit::Insert { new: 1 }]
        );
        assert_eq!(
            diff(&b, &a),
            vec![Edit::Delete { old: 0 }, Edit::Delete { old: 1 }]
        );
        assert!(diff(&a, &a).is_empty());
    }

    #[test]
    fn minimal_script_for_classic_example() {
        // Myers' paper example: ABCABBA -> CBABAC has D = 5.
        let a: Vec<char> = "ABCABBA".chars().collect();
        let b: Vec<char> = "CBABAC".chars().collect();
        let edits = diff(&a, &b);
        assert_eq!(edit_distance(&edits), 5);
    }

    #[test]
    fn script_replays_both_sides() {
        let old = ["the", "cat", "sat", "on", "the", "mat"];
        let new = ["a", "cat", "sat", "down", "on", "mat", "today"];
        let edits = diff(&old, &new);
        let (rebuilt_old, rebuilt_new) = replay(&old, &new, &edits);
        assert_eq!(rebuilt_old, old);
        assert_eq!(rebuilt_new, new);
    }

    #[test]
    fn common_prefix_is_matched_first() {
        // "a" could match either occurrence; the prefix match wins.
        let old = ["a", "b"];
        let new = ["a", "a", "b"];
        let edits = diff(&old, &new);
        assert_eq!(edits[0], Edit::Equal { old: 0, new: 0 });
        assert_eq!(edits[1], Edit::Insert { new: 1 });
    }

    #[test]
    fn runs_put_deletions_before_insertions() {
        let edits = vec![
            Edit::Equal { old: 0, new: 0 },
            Edit::Insert { new: 1 },
            Edit::Delete { old: 1 },
            Edit::Insert { new: 2 },
            Edit::Equal { old: 2, new: 3 },
        ];
        let runs = into_runs(&edits);
        assert_eq!(
            runs,
            vec![
                Run::Equal(vec![(0, 0)]),
                Run::Deleted(vec![1]),
                Run::Inserted(vec![1, 2]),
                Run::Equal(vec![(2, 3)]),
            ]
        );
    }

    #[test]
    fn diff_is_deterministic() {
        let old = ["x", "y", "x", "y"];
        let new = ["y", "x", "y", "x"];
        assert_eq!(diff(&old, &new), diff(&old, &new));
    }

    #[test]
    fn disjoint_alphabets_share_only_separators() {
        // Only the 2,999 spaces can match; everything else is edited.
        let old: Vec<char> = vec!["שלום"; 3000].join(" ").chars().collect();
        let new: Vec<char> = vec!["hello"; 3000].join(" ").chars().collect();
        let edits = diff(&old, &new);
        let equal = edits
            .iter()
            .filter(|e| matches!(e, Edit::Equal { .. }))
            .count();
        assert_eq!(equal, 2999);
        assert_eq!(edit_distance(&edits), old.len() + new.len() - 2 * 2999);
        assert!(edits
            .iter()
            .all(|e| !matches!(*e, Edit::Equal { old: i, new: j } if old[i] != new[j])));
    }
}
