// ── View resolution seam ──
//
// The runtime never renders. An external resolver turns a screen into
// whatever surface the embedding toolkit uses; conductors only expose their
// active item as a reactive value for it to follow.

use std::rc::Rc;

use crate::lifecycle::ScreenRef;
use crate::reactive::ReactiveValue;
use crate::scope::Scope;

/// Maps a screen to its renderable surface.
pub trait ViewResolver {
    type View: Clone + PartialEq + 'static;

    fn resolve(&self, screen: &ScreenRef) -> Self::View;
}

/// Follow `active_item` with a resolved view until `scope` closes.
pub fn bind_active_view<R>(
    active_item: &ReactiveValue<Option<ScreenRef>>,
    resolver: R,
    scope: &Scope,
) -> ReactiveValue<Option<R::View>>
where
    R: ViewResolver + 'static,
{
    let resolver = Rc::new(resolver);
    active_item.derive(format!("{}.view", active_item.name()), scope, move |item| {
        item.as_ref().map(|screen| resolver.resolve(screen))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::conductor::Single;
    use crate::conductor::testing::{Leaf, journal};
    use pretty_assertions::assert_eq;

    struct Named {
        calls: Rc<Cell<u32>>,
    }

    impl ViewResolver for Named {
        type View = String;

        fn resolve(&self, screen: &ScreenRef) -> String {
            self.calls.set(self.calls.get() + 1);
            format!("{}View", screen.name())
        }
    }

    #[test]
    fn view_tracks_active_item() {
        let j = journal();
        let host = Single::new("host");
        let scope = Scope::new("binding");
        let calls = Rc::new(Cell::new(0));
        let view = bind_active_view(
            host.active_item_value(),
            Named {
                calls: Rc::clone(&calls),
            },
            &scope,
        );
        assert_eq!(view.get(), None);

        host.activate_item(Leaf::shared("Home", &j)).unwrap();
        assert_eq!(view.get().as_deref(), Some("HomeView"));

        scope.close();
        host.activate_item(Leaf::shared("About", &j)).unwrap();
        assert_eq!(view.get().as_deref(), Some("HomeView"));
        assert_eq!(calls.get(), 1);
    }
}
