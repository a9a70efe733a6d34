use super::client::RelayRequest;

pub const IMAGE_COMMAND: &str = "/imagen";

/// Pick the request kind for a line of user text. Anything starting with
/// `/imagen` is a generation request; the rest of the line, trimmed, is the prompt.
pub fn route_text(input: &str) -> RelayRequest {
    match input.strip_prefix(IMAGE_COMMAND) {
        Some(rest) => RelayRequest::ImageGeneration {
            prompt: rest.trim().to_string(),
        },
        None => RelayRequest::Chat {
            message: input.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt_of(input: &str) -> Option<String> {
        match route_text(input) {
            RelayRequest::ImageGeneration { prompt } => Some(prompt),
            _ => None,
        }
    }

    #[test]
    fn imagen_prefix_routes_to_generation_with_trimmed_prompt() {
        assert_eq!(prompt_of("/imagen foo"), Some("foo".to_string()));
        assert_eq!(prompt_of("/imagen    un dragón rojo  "), Some("un dragón rojo".to_string()));
        assert_eq!(prompt_of("/imagen\tgato\nazul"), Some("gato\nazul".to_string()));
        assert_eq!(prompt_of("/imagen"), Some(String::new()));
    }

    #[test]
    fn prefix_match_does_not_need_a_separator() {
        assert_eq!(prompt_of("/imagenes de gatos"), Some("es de gatos".to_string()));
        assert_eq!(prompt_of("/imagengato"), Some("gato".to_string()));
    }

    #[test]
    fn other_text_routes_to_chat_unchanged() {
        for input in ["hola", "quiero una /imagen foo", "/IMAGEN foo", " /imagen foo"] {
            match route_text(input) {
                RelayRequest::Chat { message } => assert_eq!(message, input),
                other => panic!("{input:?} routed to {other:?}"),
            }
        }
    }
}
