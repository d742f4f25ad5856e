/// Default id of the feed container element
pub const DEFAULT_CONTAINER_ID: &str = "trakt-feed";

/// Replaces the inner HTML of the element with id `container_id`
///
/// The page is returned unchanged, with a warning, when no such element
/// exists or it is self-closing.
pub fn inject_into_container(page: &str, container_id: &str, fragment: &str) -> String {
    match find_inner_range(page, container_id) {
        Some((start, end)) => {
            let mut out = String::with_capacity(page.len() - (end - start) + fragment.len());
            out.push_str(&page[..start]);
            out.push_str(fragment);
            out.push_str(&page[end..]);
            out
        }
        None => {
            tracing::warn!(
                container = %container_id,
                "Feed container not found, page left unchanged"
            );
            page.to_string()
        }
    }
}

/// Byte range between the container's opening tag and its matching close tag
fn find_inner_range(page: &str, container_id: &str) -> Option<(usize, usize)> {
    let (tag_start, attr_pos) = find_container_tag(page, container_id)?;
    let tag_name: String = page[tag_start + 1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase();
    if tag_name.is_empty() {
        return None;
    }

    let open_end = attr_pos + page[attr_pos..].find('>')? + 1;
    if page[..open_end].ends_with("/>") {
        return None;
    }

    let lower = page.to_ascii_lowercase();
    let open_tag = format!("<{}", tag_name);
    let close_tag = format!("</{}", tag_name);
    let mut depth = 1usize;
    let mut cursor = open_end;

    while let Some(offset) = lower[cursor..].find('<') {
        let pos = cursor + offset;
        let rest = &lower[pos..];
        if rest.starts_with(&close_tag) && is_tag_boundary(rest, close_tag.len()) {
            depth -= 1;
            if depth == 0 {
                return Some((open_end, pos));
            }
        } else if rest.starts_with(&open_tag) && is_tag_boundary(rest, open_tag.len()) {
            let tag_end = rest.find('>')?;
            if !rest[..=tag_end].ends_with("/>") {
                depth += 1;
            }
        }
        cursor = pos + 1;
    }

    None
}

/// Start of the first tag carrying an `id` attribute equal to `container_id`,
/// with the attribute's offset
///
/// Matches inside text, comments or other attributes (`data-id=...`) are
/// skipped.
fn find_container_tag(page: &str, container_id: &str) -> Option<(usize, usize)> {
    let needles = [
        format!("id=\"{}\"", container_id),
        format!("id='{}'", container_id),
    ];
    let mut candidates: Vec<usize> = needles
        .iter()
        .flat_map(|needle| page.match_indices(needle.as_str()).map(|(pos, _)| pos))
        .collect();
    candidates.sort_unstable();

    candidates.into_iter().find_map(|attr_pos| {
        let before = &page[..attr_pos];
        if !before.ends_with(|c: char| c.is_ascii_whitespace()) || inside_comment(before) {
            return None;
        }
        let tag_start = before.rfind('<')?;
        let in_tag = before.rfind('>').map_or(true, |close| close < tag_start);
        let is_element = page[tag_start + 1..].starts_with(|c: char| c.is_ascii_alphabetic());
        (in_tag && is_element).then_some((tag_start, attr_pos))
    })
}

fn inside_comment(before: &str) -> bool {
    match before.rfind("<!--") {
        Some(open) => !before[open..].contains("-->"),
        None => false,
    }
}

fn is_tag_boundary(rest: &str, name_len: usize) -> bool {
    rest[name_len..]
        .chars()
        .next()
        .is_some_and(|c| c == '>' || c == '/' || c.is_ascii_whitespace())
}
