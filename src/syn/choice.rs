use crate::syn::AbstractType;

/// The selected alternative of a CHOICE. Both the index and the value are set, or neither.
#[derive(Debug, Default, Clone)]
pub struct Choice {
    pub(crate) index: Option<u64>,
    pub(crate) value: Option<Box<AbstractType>>,
}

impl Choice {
    #[inline]
    pub fn index(&self) -> Option<u64> {
        self.index
    }

    #[inline]
    pub fn value(&self) -> Option<&AbstractType> {
        self.value.as_deref()
    }

    #[inline]
    pub fn value_mut(&mut self) -> Option<&mut AbstractType> {
        self.value.as_deref_mut()
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.index.is_some()
    }

    pub fn selected(&self) -> Option<(u64, &AbstractType)> {
        self.index.zip(self.value())
    }

    pub(crate) fn set(&mut self, index: u64, value: AbstractType) -> &mut AbstractType {
        self.index = Some(index);
        self.value.insert(Box::new(value))
    }

    pub fn clear(&mut self) {
        self.index = None;
        self.value = None;
    }
}
