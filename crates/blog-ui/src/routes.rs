//! The route table. `App` mounts exactly these two views; links and nav
//! highlighting go through this module so the patterns live in one place.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteView {
    BlogList,
    BlogPost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: &'static str,
    pub name: &'static str,
    pub view: RouteView,
}

pub const HOME: RouteEntry = RouteEntry {
    path: "/",
    name: "Home",
    view: RouteView::BlogList,
};

pub const POST: RouteEntry = RouteEntry {
    path: "/post/:id",
    name: "Post",
    view: RouteView::BlogPost,
};

pub const ROUTES: &[RouteEntry] = &[HOME, POST];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    pub entry: RouteEntry,
    pub params: Vec<(String, String)>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

impl RouteEntry {
    /// Params captured from `path`, or `None` if the pattern does not match.
    pub fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let pattern = segments(self.path);
        let actual = segments(path);
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = Vec::new();
        for (expected, given) in pattern.iter().zip(actual) {
            match expected.strip_prefix(':') {
                Some(name) => params.push((name.to_string(), given.to_string())),
                None if *expected == given => {}
                None => return None,
            }
        }
        Some(params)
    }

    /// Fills the pattern's `:name` segments from `params`.
    pub fn href(&self, params: &[(&str, &str)]) -> String {
        let filled: Vec<&str> = segments(self.path)
            .into_iter()
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => params
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .unwrap_or_default(),
                None => segment,
            })
            .collect();
        format!("/{}", filled.join("/"))
    }
}

pub fn resolve(path: &str) -> Option<RouteMatch> {
    ROUTES.iter().find_map(|entry| {
        entry.matches(path).map(|params| RouteMatch {
            entry: *entry,
            params,
        })
    })
}

pub fn post_href(id: &str) -> String {
    POST.href(&[("id", id)])
}
