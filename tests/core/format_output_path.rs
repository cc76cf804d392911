//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use specsheet::core::format_output_path;

    #[test]
    fn as_is() {
        let final_destination = format_output_path(
            "/home/username/Datenblaetter/daten.txt",
            "",
            "Technische_Daten",
            "de",
        );

        assert_eq!(final_destination, "/home/username/Datenblaetter/daten.txt");
    }

    #[test]
    fn substitute_title() {
        let final_destination = format_output_path(
            "/home/username/Datenblaetter/%title%.txt",
            "Nikon Z8",
            "Technische_Daten",
            "de",
        );

        assert_eq!(final_destination, "/home/username/Datenblaetter/Nikon_Z8.txt");
    }

    #[test]
    fn substitute_title_multi() {
        let final_destination = format_output_path(
            "/home/username/%title%/%title%.txt",
            "Nikon Z8",
            "Technische_Daten",
            "de",
        );

        assert_eq!(final_destination, "/home/username/Nikon_Z8/Nikon_Z8.txt");
    }

    #[test]
    fn empty_title_uses_default() {
        let final_destination =
            format_output_path("%title%.txt", "   ", "Technische_Daten", "de");

        assert_eq!(final_destination, "Technische_Daten.txt");
    }

    #[test]
    fn sanitize() {
        let final_destination = format_output_path(
            r#"/home/username/<>:"|?/%title%.txt"#,
            r#"/\<>:"|?"#,
            "Technische_Daten",
            "de",
        );

        assert_eq!(final_destination, r#"/home/username/<>:"|?/________.txt"#);
    }

    #[test]
    fn level_up() {
        let final_destination =
            format_output_path("../%title%.txt", "EOS R5", "Technische_Daten", "de");

        assert_eq!(final_destination, "../EOS_R5.txt");
    }

    #[test]
    fn language() {
        let final_destination =
            format_output_path("%title%_%lang%.txt", "Z8", "Technische_Daten", "fr");

        assert_eq!(final_destination, "Z8_fr.txt");
    }

    #[test]
    fn timestamp_has_no_colons() {
        let final_destination =
            format_output_path("%timestamp%.txt", "", "Technische_Daten", "de");

        assert!(final_destination.ends_with(".txt"));
        assert!(!final_destination.contains(':'));
        assert!(!final_destination.contains("%timestamp%"));
    }
}
