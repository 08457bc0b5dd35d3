use crate::syn::bitstring::BitVec;
use crate::syn::info::SequenceInfo;
use crate::syn::AbstractType;
use log::warn;

/// The children of a SEQUENCE: the root components followed by the extension additions, with
/// one presence flag per optional root component and per extension addition
#[derive(Debug, Clone)]
pub struct Sequence {
    pub(crate) opt_flags: BitVec,
    pub(crate) ext_flags: BitVec,
    pub(crate) items: Vec<AbstractType>,
}

impl Sequence {
    pub(crate) fn create(info: &SequenceInfo) -> Self {
        Self {
            opt_flags: BitVec::with_len(info.size_opt() as u64),
            ext_flags: BitVec::with_len(info.size_ext() as u64),
            items: info
                .components()
                .map(|component| AbstractType::create(component.info))
                .collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn items(&self) -> &[AbstractType] {
        &self.items[..]
    }

    #[inline]
    pub fn at(&self, index: usize) -> Option<&AbstractType> {
        self.items.get(index)
    }

    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Option<&mut AbstractType> {
        self.items.get_mut(index)
    }

    #[inline]
    pub fn opt_flag(&self, index: usize) -> bool {
        self.opt_flags.bit(index as u64)
    }

    #[inline]
    pub fn set_opt_flag(&mut self, index: usize, present: bool) {
        self.opt_flags.set_bit(index as u64, present)
    }

    #[inline]
    pub fn ext_flag(&self, index: usize) -> bool {
        self.ext_flags.bit(index as u64)
    }

    #[inline]
    pub fn set_ext_flag(&mut self, index: usize, present: bool) {
        self.ext_flags.set_bit(index as u64, present)
    }

    #[inline]
    pub fn opt_flags(&self) -> &BitVec {
        &self.opt_flags
    }

    #[inline]
    pub fn ext_flags(&self) -> &BitVec {
        &self.ext_flags
    }

    /// Whether any extension addition is present, which sets the extension bit on the wire
    #[inline]
    pub fn has_extensions(&self) -> bool {
        self.ext_flags.any()
    }

    /// Presence of the component at `index` of [`SequenceInfo::components`]
    pub fn is_present(&self, info: &SequenceInfo, index: usize) -> bool {
        if index < info.size_root() {
            info.optional_index(index)
                .map_or(true, |optional| self.opt_flag(optional))
        } else {
            self.ext_flag(index - info.size_root())
        }
    }

    pub(crate) fn set_present(&mut self, info: &SequenceInfo, index: usize, present: bool) {
        if index < info.size_root() {
            if let Some(optional) = info.optional_index(index) {
                self.set_opt_flag(optional, present);
            } else if !present {
                warn!(
                    "Component {} of {} is not optional and stays present",
                    index, info.name
                );
            }
        } else {
            self.set_ext_flag(index - info.size_root(), present);
        }
    }
}
