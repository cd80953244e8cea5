//! 会话存储
//!
//! 一次交互会话内的内存状态：已上传的书籍和当前题目集。
//! 不做持久化；由调用方持有并按引用传入各个流程，不使用全局单例。

use crate::error::BusinessError;
use crate::models::{derive_external_key, BookRef, QuestionSet};
use tracing::debug;

#[derive(Debug, Default)]
pub struct SessionStore {
    books: Vec<BookRef>,
    current: Option<QuestionSet>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 检查书籍能否登记（外部标识不能与其他书冲突）
    pub fn ensure_registrable(&self, book: &BookRef) -> Result<(), BusinessError> {
        if let Some(existing) = self.books.iter().find(|b| {
            b.external_key == book.external_key && b.display_name != book.display_name
        }) {
            return Err(BusinessError::ExternalKeyConflict {
                external_key: book.external_key.clone(),
                existing: existing.display_name.clone(),
            });
        }
        Ok(())
    }

    /// 登记书籍
    ///
    /// 同名书籍重复登记时原位替换（保持顺序），不会出现两条同名记录。
    pub fn register_book(&mut self, book: BookRef) -> Result<(), BusinessError> {
        self.ensure_registrable(&book)?;

        match self
            .books
            .iter_mut()
            .find(|b| b.display_name == book.display_name)
        {
            Some(slot) => {
                debug!("更新书籍: {} -> {}", slot, book);
                *slot = book;
            }
            None => {
                debug!("登记书籍: {}", book);
                self.books.push(book);
            }
        }
        Ok(())
    }

    /// 按登记顺序列出书籍
    pub fn list_books(&self) -> &[BookRef] {
        &self.books
    }

    pub fn find_book(&self, display_name: &str) -> Option<&BookRef> {
        let display_name = display_name.trim();
        self.books.iter().find(|b| b.display_name == display_name)
    }

    /// 已登记则返回登记的外部标识，否则按显示名推导
    pub fn external_key_for(&self, display_name: &str) -> String {
        self.find_book(display_name)
            .map(|b| b.external_key.clone())
            .unwrap_or_else(|| derive_external_key(display_name.trim()))
    }

    /// 替换当前题目集
    pub fn set_current_questions(&mut self, set: QuestionSet) {
        debug!("当前题目集: 《{}》 {} 题", set.book.display_name, set.len());
        self.current = Some(set);
    }

    pub fn current_questions(&self) -> Option<&QuestionSet> {
        self.current.as_ref()
    }

    /// 清空会话
    pub fn clear(&mut self) {
        self.books.clear();
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, DifficultyRange, GenerationRequest, QuestionRecord};

    fn set_for(book: &BookRef, n: usize) -> QuestionSet {
        QuestionSet::new(
            book.clone(),
            GenerationRequest {
                category: Category::Comprehension,
                question_count: n as u32,
                difficulty: DifficultyRange::Medium,
            },
            (0..n)
                .map(|i| QuestionRecord {
                    question: format!("Q{}", i),
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn test_same_display_name_is_replaced_in_place() {
        let mut store = SessionStore::new();
        store.register_book(BookRef::new("가방 들어주는 아이", Some("bag_v1"))).unwrap();
        store.register_book(BookRef::new("어린 왕자", Some("little_prince"))).unwrap();
        store.register_book(BookRef::new("가방 들어주는 아이", Some("bag_v2"))).unwrap();

        let books = store.list_books();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].display_name, "가방 들어주는 아이");
        assert_eq!(books[0].external_key, "bag_v2");
        assert_eq!(store.external_key_for("가방 들어주는 아이"), "bag_v2");
    }

    #[test]
    fn test_external_key_conflict_is_rejected() {
        let mut store = SessionStore::new();
        store.register_book(BookRef::new("Book One", Some("shared"))).unwrap();

        let err = store
            .register_book(BookRef::new("Book Two", Some("shared")))
            .unwrap_err();
        assert!(matches!(err, BusinessError::ExternalKeyConflict { .. }));
        assert_eq!(store.list_books().len(), 1);
    }

    #[test]
    fn test_external_key_for_unregistered_book_is_derived() {
        let store = SessionStore::new();
        assert_eq!(store.external_key_for("The Little Prince"), "the_little_prince");
    }

    #[test]
    fn test_current_questions_round_trip() {
        let mut store = SessionStore::new();
        assert!(store.current_questions().is_none());

        let book = BookRef::new("책", None);
        let first = set_for(&book, 2);
        let second = set_for(&book, 3);

        store.set_current_questions(first);
        store.set_current_questions(second.clone());
        assert_eq!(store.current_questions(), Some(&second));

        store.clear();
        assert!(store.current_questions().is_none());
        assert!(store.list_books().is_empty());
    }
}
