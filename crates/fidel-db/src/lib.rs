use camino::Utf8PathBuf;
pub use fidel_errors::Diagnostic;
use fidel_parse::Parse;
use fidel_syntax::Arena;
pub use line_index::LineIndex;

#[salsa::db]
pub trait Db: salsa::Database {
    /// The arena every tree parsed through this database is allocated in.
    fn arena(&self) -> &Arena;
}

#[salsa::db]
#[derive(Clone, Default)]
pub struct RootDatabase {
    storage: salsa::Storage<Self>,
    arena: Arena,
}

#[salsa::db]
impl salsa::Database for RootDatabase {}

#[salsa::db]
impl Db for RootDatabase {
    fn arena(&self) -> &Arena {
        &self.arena
    }
}

#[salsa::input(debug)]
pub struct SourceFile {
    #[returns(ref)]
    pub path: Utf8PathBuf,
    #[returns(deref)]
    pub text: String,
}

#[salsa::tracked]
impl SourceFile {
    /// Changing the text re-parses the whole file. Cached elements that
    /// earlier parses no longer use are swept from the arena first.
    #[salsa::tracked(returns(ref), no_eq)]
    pub fn parse(self, db: &dyn Db) -> Parse {
        db.arena().maybe_collect_garbage();
        fidel_parse::parse(db.arena(), self.text(db))
    }

    #[salsa::tracked(returns(ref), no_eq)]
    pub fn diagnostics(self, db: &dyn Db) -> Vec<Diagnostic> {
        self.parse(db).diagnostics()
    }

    #[salsa::tracked(returns(ref), no_eq)]
    pub fn line_index(self, db: &dyn Db) -> LineIndex {
        LineIndex::new(self.text(db))
    }
}
