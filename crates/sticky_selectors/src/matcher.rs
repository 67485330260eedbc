//! Selector matching, right-to-left with backtracking over ancestor and
//! sibling combinators.

use crate::{
    Combinator, ComplexSelector, CompoundSelector, ElementAdapter, SelectorList, SimpleSelector,
};

/// Match a selector list against an element.
pub fn matches_selector_list<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    list: &SelectorList,
) -> bool {
    list.selectors
        .iter()
        .any(|selector_item| matches_complex(adapter, element, selector_item))
}

/// Match a complex selector against an element.
pub fn matches_complex<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
) -> bool {
    matches_from(adapter, element, sel, sel.rest.len())
}

/// Compound at `index` in the flattened `first, rest..` sequence.
fn compound_at(sel: &ComplexSelector, index: usize) -> Option<&CompoundSelector> {
    if index == 0 {
        Some(&sel.first)
    } else {
        sel.rest.get(index - 1).map(|pair| &pair.1)
    }
}

/// True if `element` matches the compound at `index` and everything to its left.
fn matches_from<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
    index: usize,
) -> bool {
    let Some(compound) = compound_at(sel, index) else {
        return false;
    };
    if !matches_compound(adapter, element, compound) {
        return false;
    }
    if index == 0 {
        return true;
    }
    let Some(&(combinator, _)) = sel.rest.get(index - 1) else {
        return false;
    };
    let left = index - 1;
    match combinator {
        Combinator::Child => adapter
            .parent(element)
            .is_some_and(|parent| matches_from(adapter, parent, sel, left)),
        Combinator::AdjacentSibling => adapter
            .previous_sibling_element(element)
            .is_some_and(|prev| matches_from(adapter, prev, sel, left)),
        Combinator::Descendant => {
            let mut current = adapter.parent(element);
            while let Some(ancestor) = current {
                if matches_from(adapter, ancestor, sel, left) {
                    return true;
                }
                current = adapter.parent(ancestor);
            }
            false
        }
        Combinator::GeneralSibling => {
            let mut current = adapter.previous_sibling_element(element);
            while let Some(sibling) = current {
                if matches_from(adapter, sibling, sel, left) {
                    return true;
                }
                current = adapter.previous_sibling_element(sibling);
            }
            false
        }
    }
}

/// Match a compound selector against a single element.
pub fn matches_compound<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compound: &CompoundSelector,
) -> bool {
    compound.simples.iter().all(|simple| match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(type_name) => adapter.tag_name(element) == type_name.as_str(),
        SimpleSelector::Class(class_name) => adapter.has_class(element, class_name),
        SimpleSelector::IdSelector(id_value) => adapter
            .element_id(element)
            .is_some_and(|value| value == id_value.as_str()),
        SimpleSelector::AttrExists(name) => adapter.attr(element, name).is_some(),
        SimpleSelector::AttrEquals { name, value } => adapter
            .attr(element, name)
            .is_some_and(|attr_value| attr_value == value.as_str()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_selector_list;

    /// Flat test tree: index = handle, (tag, classes, parent, previous sibling).
    struct Tree {
        nodes: Vec<(&'static str, &'static [&'static str], Option<usize>, Option<usize>)>,
    }

    impl ElementAdapter for Tree {
        type Handle = usize;

        fn parent(&self, element: usize) -> Option<usize> {
            self.nodes.get(element).and_then(|node| node.2)
        }

        fn previous_sibling_element(&self, element: usize) -> Option<usize> {
            self.nodes.get(element).and_then(|node| node.3)
        }

        fn tag_name(&self, element: usize) -> &str {
            self.nodes.get(element).map_or("", |node| node.0)
        }

        fn element_id(&self, _element: usize) -> Option<&str> {
            None
        }

        fn has_class(&self, element: usize, class: &str) -> bool {
            self.nodes
                .get(element)
                .is_some_and(|node| node.1.contains(&class))
        }

        fn attr(&self, _element: usize, _name: &str) -> Option<&str> {
            None
        }
    }

    // <main><section class="a"><div class="b"><h2 class="sticky"/></div><p/></section></main>
    fn tree() -> Tree {
        Tree {
            nodes: vec![
                ("main", &[], None, None),
                ("section", &["a"], Some(0), None),
                ("div", &["b"], Some(1), None),
                ("h2", &["sticky"], Some(2), None),
                ("p", &[], Some(1), Some(2)),
            ],
        }
    }

    fn matches(selector: &str, element: usize) -> bool {
        matches_selector_list(&tree(), element, &parse_selector_list(selector))
    }

    #[test]
    fn descendant_backtracks_past_non_matching_ancestors() {
        assert!(matches("main .sticky", 3));
        assert!(matches("section.a div h2", 3));
        assert!(!matches("p .sticky", 3));
    }

    #[test]
    fn child_requires_direct_parent() {
        assert!(matches("div > h2", 3));
        assert!(!matches("section > h2", 3));
        assert!(matches("main section > div > .sticky", 3));
    }

    #[test]
    fn sibling_combinators() {
        assert!(matches("div + p", 4));
        assert!(matches(".b ~ p", 4));
        assert!(!matches("h2 + p", 4));
    }

    #[test]
    fn invalid_list_matches_nothing() {
        assert!(!matches("h2, ::", 3));
        assert!(matches("span, h2", 3));
    }
}
