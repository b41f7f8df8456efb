use std::collections::BTreeSet;

/// The outcome of one tag rule: tags to add, and how they interact with the
/// tags produced by the other rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    add: Vec<&'static str>,
    remove: Vec<&'static str>,
    blocked_by: Vec<&'static str>,
    blocks: Vec<&'static str>,
    if_present: Vec<&'static str>,
}

impl TagSet {
    /// A rule result that adds `tags`
    pub fn new(tags: &[&'static str]) -> TagSet {
        TagSet {
            add: tags.to_vec(),
            ..TagSet::default()
        }
    }

    /// Tags removed from whatever the other rules add
    pub fn remove(mut self, tags: &[&'static str]) -> TagSet {
        self.remove.extend_from_slice(tags);
        self
    }

    /// Not applied when any of `tags` is already present
    pub fn blocked_by(mut self, tags: &[&'static str]) -> TagSet {
        self.blocked_by.extend_from_slice(tags);
        self
    }

    /// Prevents later rules from adding any of `tags`
    pub fn blocks(mut self, tags: &[&'static str]) -> TagSet {
        self.blocks.extend_from_slice(tags);
        self
    }

    /// Only applied when all of `tags` are present
    pub fn if_present(mut self, tags: &[&'static str]) -> TagSet {
        self.if_present.extend_from_slice(tags);
        self
    }

    fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty() && self.blocks.is_empty()
    }
}

/// Combine the results of all tag rules into the final set of tags.
///
/// Rules that remove or block go first, rules that can be blocked go after
/// those that cannot, and rules that depend on other tags go last. Within
/// those constraints the input order is kept.
pub fn resolve(sets: Vec<TagSet>) -> BTreeSet<&'static str> {
    let mut sets: Vec<TagSet> = sets.into_iter().filter(|s| !s.is_empty()).collect();
    sets.sort_by_key(|s| std::cmp::Reverse(s.remove.len() + s.blocks.len()));
    sets.sort_by_key(|s| s.blocked_by.len());
    sets.sort_by_key(|s| s.if_present.len());

    let mut tags = BTreeSet::new();
    let mut removals = BTreeSet::new();
    let mut blocked = BTreeSet::new();
    for set in sets {
        if !set.if_present.iter().all(|t| tags.contains(t)) {
            continue;
        }
        let allowed = !set.blocked_by.iter().any(|t| tags.contains(t))
            && !set.add.iter().any(|t| blocked.contains(t));
        if allowed {
            removals.extend(set.remove.iter().copied());
            tags.extend(set.add.iter().copied().filter(|t| !removals.contains(t)));
            blocked.extend(set.blocks.iter().copied());
        }
    }
    tags
}
