use log::trace;

struct Slot<K, V> {
    generation: u64,
    entry: Option<(K, V)>,
}

/// Fixed-capacity cache that keeps the most recently used values.
///
/// Every lookup advances a logical clock. A hit refreshes the slot; a miss
/// fills the first empty slot, or else evicts the oldest slot (lowest index on
/// ties) through the disposer. Each value is owned by exactly one slot.
pub struct MostUsedCache<K, V, D = fn(K, V)>
where
    D: FnMut(K, V),
{
    slots: Vec<Slot<K, V>>,
    generation: u64,
    dispose: D,
}

fn drop_entry<K, V>(_key: K, _value: V) {}

impl<K: Clone + PartialEq, V> MostUsedCache<K, V> {
    /// Evicted values are simply dropped.
    pub fn new(capacity: usize) -> Self {
        Self::with_disposer(capacity, drop_entry::<K, V>)
    }
}

impl<K: Clone + PartialEq, V, D: FnMut(K, V)> MostUsedCache<K, V, D> {
    pub fn with_disposer(capacity: usize, dispose: D) -> Self {
        let mut slots = Vec::with_capacity(capacity.max(1));
        for _ in 0..capacity.max(1) {
            slots.push(Slot { generation: 0, entry: None });
        }
        Self { slots, generation: 0, dispose }
    }

    /// Occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &K) -> bool {
        self.slots.iter().any(|s| matches!(&s.entry, Some((k, _)) if k == key))
    }

    /// Returns the cached value for `key`, building it with `create` on a miss.
    pub fn get<E>(
        &mut self,
        key: &K,
        create: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<&mut V, E> {
        let idx = self.slot_for(key, create)?;
        Ok(self.value_mut(idx))
    }

    /// Two distinct entries at once: `a` shared, `b` exclusive.
    /// Needs at least two slots so that loading `b` cannot evict `a`.
    pub fn get_pair<E>(
        &mut self,
        a: &K,
        b: &K,
        mut create: impl FnMut(&K) -> Result<V, E>,
    ) -> Result<(&V, &mut V), E> {
        assert!(a != b, "get_pair needs distinct keys");
        assert!(self.slots.len() >= 2, "get_pair needs two slots");

        let ia = self.slot_for(a, &mut create)?;
        let ib = self.slot_for(b, &mut create)?;

        let (va, vb) = if ia < ib {
            let (head, tail) = self.slots.split_at_mut(ib);
            (&head[ia], &mut tail[0])
        } else {
            let (head, tail) = self.slots.split_at_mut(ia);
            (&tail[0], &mut head[ib])
        };
        match (&va.entry, &mut vb.entry) {
            (Some((_, va)), Some((_, vb))) => Ok((va, vb)),
            _ => unreachable!("slots were just filled"),
        }
    }

    /// Tears down every occupied slot.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Some((k, v)) = slot.entry.take() {
                (self.dispose)(k, v);
            }
            slot.generation = 0;
        }
    }

    fn slot_for<E>(
        &mut self,
        key: &K,
        create: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<usize, E> {
        self.generation += 1;
        let generation = self.generation;

        let mut victim = 0;
        let mut oldest = u64::MAX;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            match &slot.entry {
                None => {
                    if oldest > 0 {
                        oldest = 0;
                        victim = i;
                    }
                }
                Some((k, _)) if k == key => {
                    slot.generation = generation;
                    return Ok(i);
                }
                Some(_) => {
                    if slot.generation < oldest {
                        oldest = slot.generation;
                        victim = i;
                    }
                }
            }
        }

        if let Some((k, v)) = self.slots[victim].entry.take() {
            trace!("cache evicting slot {}", victim);
            (self.dispose)(k, v);
        }
        let value = create(key)?;
        self.slots[victim] = Slot { generation, entry: Some((key.clone(), value)) };
        Ok(victim)
    }

    #[cfg(test)]
    fn slot_of(&self, key: &K) -> Option<usize> {
        self.slots.iter().position(|s| matches!(&s.entry, Some((k, _)) if k == key))
    }

    fn value_mut(&mut self, idx: usize) -> &mut V {
        match &mut self.slots[idx].entry {
            Some((_, v)) => v,
            None => unreachable!("slot was just filled"),
        }
    }
}

impl<K, V, D: FnMut(K, V)> Drop for MostUsedCache<K, V, D> {
    fn drop(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Some((k, v)) = slot.entry.take() {
                (self.dispose)(k, v);
            }
        }
    }
}
