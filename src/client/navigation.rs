use super::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Todos,
}

/// Outcome of a view action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Login,
}

/// Resolve `path` to the view to show. The todo list requires a logged-in
/// session and falls back to the login view otherwise.
pub fn resolve(path: &str, session: &Session) -> Option<View> {
    let view = match path.trim_end_matches('/') {
        "" | "/todos" => View::Todos,
        "/login" => View::Login,
        "/register" => View::Register,
        _ => return None,
    };

    if view == View::Todos && !session.is_authenticated() {
        return Some(View::Login);
    }
    Some(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client::session::MemoryStore, model::UserInfo};

    #[test]
    fn todos_require_login() {
        let mut session = Session::restore(MemoryStore::default());
        assert_eq!(resolve("/", &session), Some(View::Login));
        assert_eq!(resolve("/todos", &session), Some(View::Login));
        assert_eq!(resolve("/register", &session), Some(View::Register));

        session
            .login(
                "tok".into(),
                UserInfo {
                    id: 1,
                    username: "ada".into(),
                },
            )
            .unwrap();
        assert_eq!(resolve("/", &session), Some(View::Todos));
        assert_eq!(resolve("/todos/", &session), Some(View::Todos));
    }

    #[test]
    fn unknown_paths_resolve_to_nothing() {
        let session = Session::restore(MemoryStore::default());
        assert_eq!(resolve("/admin", &session), None);
    }
}
